use std::fmt::Debug;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use mmwave_core::models::r60abd1::R60Abd1;
use mmwave_core::models::r60afd1::R60Afd1;
use mmwave_core::models::r60amp1::R60Amp1;
use mmwave_core::DeviceProfile;
use mmwave_driver::device::r60abd1::Abd1Config;
use mmwave_driver::device::r60afd1::Afd1Config;
use mmwave_driver::device::r60amp1::Amp1Config;
use mmwave_driver::{
    FeatureConfig, OperationError, R60Abd1Device, R60Afd1Device, R60Amp1Device, RadarDevice,
    SerialTransport, Settings,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ModelArg {
    R60amp1,
    R60abd1,
    R60afd1,
}

/// Monitor an R60 series radar on a serial port
#[derive(Parser, Clone, Debug)]
#[command(version, about)]
struct Cli {
    #[clap(flatten)]
    verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Serial device, e.g. /dev/ttyUSB0
    #[arg(short, long)]
    device: String,

    /// Radar model on the port
    #[arg(short, long, value_enum)]
    model: ModelArg,

    /// JSON file with `settings` (engine timing) and `features` (model configuration)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Milliseconds between state reports
    #[arg(short, long, default_value_t = 1000)]
    interval: u64,

    /// Number of state reports before exiting, 0 runs until killed
    #[arg(short = 'n', long, default_value_t = 0)]
    count: u64,

    /// Run every query once after start-up and print the answers
    #[arg(long, default_value_t = false)]
    query: bool,
}

#[derive(Deserialize, Default, Debug)]
#[serde(default)]
struct ConfigFile {
    settings: Settings,
    features: Value,
}

fn load_config(path: Option<&PathBuf>) -> Result<ConfigFile> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let text = fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    let config: ConfigFile =
        serde_json::from_str(&text).with_context(|| format!("Cannot parse {}", path.display()))?;
    config.settings.validate()?;
    Ok(config)
}

fn parse_features<C: serde::de::DeserializeOwned + Default>(value: Value) -> Result<C> {
    if value.is_null() {
        return Ok(C::default());
    }
    serde_json::from_value(value).context("Invalid feature configuration")
}

/// Collects query answers into one JSON object
struct Sweep(Map<String, Value>);

impl Sweep {
    fn record<T: Debug>(&mut self, name: &str, result: Result<T, OperationError>) {
        let value = match result {
            Ok(v) => json!(format!("{:?}", v)),
            Err(e) => {
                if e.is_fault() {
                    warn!("{}: {}", name, e);
                }
                json!({ "error": e.to_string() })
            }
        };
        self.0.insert(name.to_string(), value);
    }
}

fn sweep_common<P: DeviceProfile, C: FeatureConfig<P>>(radar: &RadarDevice<P, C>, sweep: &mut Sweep) {
    sweep.record("heartbeat", radar.query_heartbeat(None));
    sweep.record("product_model", radar.query_product_model(None));
    sweep.record("product_id", radar.query_product_id(None));
    sweep.record("hardware_model", radar.query_hardware_model(None));
    sweep.record("firmware_version", radar.query_firmware_version(None));
    sweep.record("init_complete", radar.query_init_complete(None));
}

fn sweep_amp1(radar: &R60Amp1Device, sweep: &mut Sweep) {
    sweep.record("presence_switch", radar.query_human_presence_switch(None));
    sweep.record("presence_status", radar.query_presence_status(None));
    sweep.record("motion", radar.query_motion_info(None));
    sweep.record("body_motion", radar.query_body_motion_parameter(None));
    sweep.record("trajectory", radar.query_trajectory_info(None));
}

fn sweep_abd1(radar: &R60Abd1Device, sweep: &mut Sweep) {
    sweep.record("radar_range_boundary", radar.query_radar_range_boundary(None));
    sweep.record("presence_switch", radar.query_human_presence_switch(None));
    sweep.record("presence_status", radar.query_presence_status(None));
    sweep.record("motion", radar.query_human_motion_info(None));
    sweep.record("body_motion", radar.query_body_motion_parameter(None));
    sweep.record("distance", radar.query_human_distance(None));
    sweep.record("direction", radar.query_human_direction(None));
    sweep.record("heart_rate_switch", radar.query_heart_rate_monitor_switch(None));
    sweep.record("heart_rate_waveform_switch", radar.query_heart_rate_waveform_report_switch(None));
    sweep.record("heart_rate", radar.query_heart_rate_value(None));
    sweep.record("heart_rate_waveform", radar.query_heart_rate_waveform(None));
    sweep.record("breath_switch", radar.query_breath_monitor_switch(None));
    sweep.record("breath_waveform_switch", radar.query_breath_waveform_report_switch(None));
    sweep.record("low_breath_threshold", radar.query_low_breath_threshold(None));
    sweep.record("breath_info", radar.query_breath_info(None));
    sweep.record("breath_rate", radar.query_breath_value(None));
    sweep.record("breath_waveform", radar.query_breath_waveform(None));
    sweep.record("sleep_switch", radar.query_sleep_monitor_switch(None));
    sweep.record("struggle_switch", radar.query_abnormal_struggle_monitor_switch(None));
    sweep.record("struggle_status", radar.query_abnormal_struggle_status(None));
    sweep.record("struggle_sensitivity", radar.query_struggle_sensitivity(None));
    sweep.record("no_person_timing_switch", radar.query_no_person_timing_switch(None));
    sweep.record("no_person_timing_duration", radar.query_no_person_timing_duration(None));
    sweep.record("no_person_timing_status", radar.query_no_person_timing_status(None));
    sweep.record("sleep_end_duration", radar.query_sleep_end_duration(None));
    sweep.record("bed_status", radar.query_bed_status(None));
    sweep.record("sleep_status", radar.query_sleep_status(None));
    sweep.record("awake_duration", radar.query_awake_duration(None));
    sweep.record("light_sleep_duration", radar.query_light_sleep_duration(None));
    sweep.record("deep_sleep_duration", radar.query_deep_sleep_duration(None));
    sweep.record("sleep_quality_score", radar.query_sleep_quality_score(None));
    sweep.record("sleep_summary", radar.query_sleep_comprehensive_status(None));
    sweep.record("sleep_anomaly", radar.query_sleep_anomaly(None));
    sweep.record("sleep_statistics", radar.query_sleep_statistics(None));
    sweep.record("sleep_quality_level", radar.query_sleep_quality_level(None));
}

fn sweep_afd1(radar: &R60Afd1Device, sweep: &mut Sweep) {
    sweep.record("scene", radar.query_scene_info(None));
    sweep.record("install_angle", radar.query_install_angle(None));
    sweep.record("install_height", radar.query_install_height(None));
    sweep.record("presence_switch", radar.query_presence_switch(None));
    sweep.record("presence_status", radar.query_presence_status(None));
    sweep.record("motion", radar.query_motion_status(None));
    sweep.record("body_motion", radar.query_body_motion_param(None));
    sweep.record("static_distance", radar.query_static_distance(None));
    sweep.record("motion_distance", radar.query_motion_distance(None));
    sweep.record("no_person_time", radar.query_no_person_time(None));
    sweep.record("presence_threshold", radar.query_presence_threshold(None));
    sweep.record("energy_report_switch", radar.query_energy_report_switch(None));
    sweep.record("max_energy", radar.query_max_energy(None));
    sweep.record("fall_switch", radar.query_fall_detection_switch(None));
    sweep.record("fall_status", radar.query_fall_status(None));
    sweep.record("fall_duration", radar.query_fall_duration(None));
    sweep.record("fall_sensitivity", radar.query_fall_sensitivity(None));
    sweep.record("fall_break_height", radar.query_fall_break_height(None));
    sweep.record("height_accumulation", radar.query_height_accumulation_time(None));
    sweep.record("static_stay_switch", radar.query_static_stay_switch(None));
    sweep.record("static_stay_status", radar.query_static_stay_status(None));
    sweep.record("static_stay_duration", radar.query_static_stay_duration(None));
    sweep.record("height_ratio_switch", radar.query_height_ratio_switch(None));
    sweep.record("height_ratio", radar.query_height_ratio(None));
    sweep.record("track_switch", radar.query_track_switch(None));
    sweep.record("track_point", radar.query_track_point(None));
    sweep.record("track_frequency", radar.query_track_frequency(None));
}

fn monitor<P, C>(
    cli: &Cli,
    config: ConfigFile,
    sweep_model: fn(&RadarDevice<P, C>, &mut Sweep),
) -> Result<()>
where
    P: DeviceProfile,
    C: FeatureConfig<P>,
{
    let transport = SerialTransport::open(&cli.device)
        .with_context(|| format!("Cannot open {}", cli.device))?;
    let features: C = parse_features(config.features)?;
    let mut radar = RadarDevice::<P, C>::new(transport, features, config.settings)?;

    println!("{}", serde_json::to_string_pretty(&radar.configuration_status())?);

    if cli.query {
        let mut sweep = Sweep(Map::new());
        sweep_common(&radar, &mut sweep);
        sweep_model(&radar, &mut sweep);
        println!("{}", serde_json::to_string_pretty(&Value::Object(sweep.0))?);
    }

    let mut reports = 0;
    while cli.count == 0 || reports < cli.count {
        thread::sleep(Duration::from_millis(cli.interval));
        println!("{}", serde_json::to_string(&radar.state())?);
        reports += 1;
    }

    let stats = radar.close();
    info!("{}: {}", cli.device, stats);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let config = load_config(cli.config.as_ref())?;
    match cli.model {
        ModelArg::R60amp1 => monitor::<R60Amp1, Amp1Config>(&cli, config, sweep_amp1),
        ModelArg::R60abd1 => monitor::<R60Abd1, Abd1Config>(&cli, config, sweep_abd1),
        ModelArg::R60afd1 => monitor::<R60Afd1, Afd1Config>(&cli, config, sweep_afd1),
    }
}
