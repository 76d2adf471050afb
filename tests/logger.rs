// Fake Frog — End-to-end runs against a directory-backed card with virtual time

use std::fs;
use std::path::PathBuf;

use fakefrog::clock::Timestamp;
use fakefrog::config::{ChannelConfig, LoggerConfig, VERSION};
use fakefrog::convert;
use fakefrog::drivers::sim::{ManualClock, ScriptedAnalog, VirtualTimebase};
use fakefrog::drivers::Timebase;
use fakefrog::storage::DirMedium;
use fakefrog::tasks::scheduler::{boot, Board};

fn temp_card(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fakefrog_it_{}_{}", tag, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn config(channels: usize) -> LoggerConfig {
    LoggerConfig {
        sample_count: 4,
        sample_delay_ms: 10,
        reading_interval_s: 60,
        ..LoggerConfig::with_channels(channels)
    }
}

fn run_once(dir: &PathBuf, inputs: Vec<ScriptedAnalog>, channels: usize, ticks: u64) -> VirtualTimebase {
    let tb = VirtualTimebase::new();
    let board = Board {
        medium: DirMedium::open(dir),
        inputs,
        rtc: ManualClock::new(Timestamp::new(2024, 6, 1, 12, 0, 0).unwrap(), &tb),
        timebase: tb.clone(),
    };
    let mut logger = boot(config(channels), board, None).unwrap();
    logger.run_ticks(&mut (), ticks);
    tb
}

#[test]
fn one_hour_of_logging() {
    let dir = temp_card("hour");
    let tb = run_once(&dir, vec![ScriptedAnalog::constant(0, 512)], 1, 3600);

    // Readings at 60 s, 120 s, ... 3540 s.
    let data = fs::read_to_string(dir.join("data_000.csv")).unwrap();
    let lines: Vec<&str> = data.lines().collect();
    assert_eq!(lines[0], "Timestamp,Temp1");
    assert_eq!(lines.len(), 1 + 59);
    assert_eq!(lines[1], "2024-06-01T12:01:00,24.96");
    assert_eq!(lines[59], "2024-06-01T12:59:00,24.96");

    // Sampling delays are absorbed by the tick sleep.
    assert_eq!(tb.now_ms(), 3600 * 1000);

    let log = fs::read_to_string(dir.join("log_000.txt")).unwrap();
    assert!(log.contains(&format!(
        "Data logger started at 2024-06-01T12:00:00. Software version: {}",
        VERSION
    )));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn columns_follow_channel_order() {
    let dir = temp_card("multi");
    let inputs = vec![
        ScriptedAnalog::constant(0, 300),
        ScriptedAnalog::constant(1, 512),
        ScriptedAnalog::constant(2, 700),
    ];
    run_once(&dir, inputs, 3, 61);

    let data = fs::read_to_string(dir.join("data_000.csv")).unwrap();
    let mut lines = data.lines();
    assert_eq!(lines.next(), Some("Timestamp,Temp1,Temp2,Temp3"));

    let record = lines.next().unwrap();
    let fields: Vec<&str> = record.split(',').collect();
    assert_eq!(fields[0], "2024-06-01T12:01:00");
    let temps: Vec<f64> = fields[1..].iter().map(|f| f.parse().unwrap()).collect();
    assert!(temps[0] > temps[1] && temps[1] > temps[2], "{temps:?}");

    let channel = ChannelConfig::standard(0);
    let expected = convert::temperature_from_resistance(
        convert::resistance_from_raw(300.0, channel.series_resistance, 1023.0),
        channel.nominal_resistance,
        channel.beta,
        convert::celsius_to_kelvin(channel.nominal_temp_c),
    );
    assert_eq!(fields[1], format!("{:.2}", expected));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn each_run_claims_new_files() {
    let dir = temp_card("runs");
    for _ in 0..3 {
        run_once(&dir, vec![ScriptedAnalog::constant(0, 512)], 1, 1);
    }

    for i in 0..3 {
        assert!(dir.join(format!("data_{:03}.csv", i)).exists());
        assert!(dir.join(format!("log_{:03}.txt", i)).exists());
    }
    assert!(!dir.join("data_003.csv").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_card_halts_boot() {
    let dir = std::env::temp_dir().join(format!("fakefrog_it_absent_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);

    let tb = VirtualTimebase::new();
    let board = Board {
        medium: DirMedium::open(&dir),
        inputs: vec![ScriptedAnalog::constant(0, 512)],
        rtc: ManualClock::new(Timestamp::new(2024, 6, 1, 12, 0, 0).unwrap(), &tb),
        timebase: tb,
    };
    let halt = boot(config(1), board, None).err().unwrap();
    assert!(halt.to_string().starts_with("halted: Failed."), "{halt}");
}
