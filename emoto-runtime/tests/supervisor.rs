use std::{sync::Arc, time::Duration};

use emoto::{
    core::{Battery, KeyCode, SeededRandom},
    device::{InputSource, RecordingRenderer, ScriptedInput},
    Config, Supervisor, Termination,
};

const RUN_TIMEOUT: Duration = Duration::from_secs(10);

fn config(capacity: i32, decay_interval_ms: u64) -> Config {
    let mut config = Config::default();
    config.battery.initial_capacity = Some(capacity);
    config.battery.decay_interval_ms = decay_interval_ms;
    config.battery.drift_interval_ms = 10;
    config.dashboard.tick_interval_ms = 5;
    config.dashboard.input_poll_ms = 5;
    config
}

fn battery(config: &Config) -> Arc<Battery> {
    Arc::new(Battery::initialize(
        config.battery.clone(),
        Box::new(SeededRandom::new(42)),
    ))
}

struct BrokenInput;

impl InputSource for BrokenInput {
    fn name(&self) -> &str {
        "broken"
    }

    fn read_key(&mut self, _timeout: Duration) -> std::io::Result<Option<KeyCode>> {
        Err(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "device unplugged",
        ))
    }
}

#[tokio::test]
async fn battery_drains_while_riding() {
    let config = config(31, 400);
    let battery = battery(&config);
    let recorder = RecordingRenderer::new();

    let supervisor = Supervisor::new(&config, battery.clone());
    let input = ScriptedInput::parse("1HHH", Duration::from_millis(20));

    let termination = tokio::time::timeout(
        RUN_TIMEOUT,
        supervisor.run(Box::new(input), Box::new(recorder.clone())),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(termination, Termination::BatteryEmpty);
    assert_eq!(recorder.termination(), Some(Termination::BatteryEmpty));

    let last = recorder.last().unwrap();
    assert!(last.powered_on);
    assert_eq!(last.speed, 53);
    assert_eq!(last.battery_level, 0);
    assert_eq!(battery.capacity(), 30);

    let snapshots = recorder.snapshots();
    assert!(snapshots
        .windows(2)
        .all(|pair| pair[1].battery_level <= pair[0].battery_level));
    assert!(snapshots
        .iter()
        .all(|s| s.fan_on == (s.battery_temperature > 50)));
}

#[tokio::test]
async fn power_off_exits_and_stops_battery() {
    let config = config(70, 50);
    let battery = battery(&config);
    let recorder = RecordingRenderer::new();

    let supervisor = Supervisor::new(&config, battery.clone());
    let input = ScriptedInput::parse("10", Duration::from_millis(20));

    let termination = tokio::time::timeout(
        RUN_TIMEOUT,
        supervisor.run(Box::new(input), Box::new(recorder.clone())),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(termination, Termination::UserExit);
    assert!(!recorder.last().unwrap().powered_on);

    let charge = battery.charge();
    let thermal = battery.thermal();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(battery.charge(), charge);
    assert_eq!(battery.thermal(), thermal);
}

#[tokio::test]
async fn quit_key_exits() {
    let config = config(70, 4_000);
    let recorder = RecordingRenderer::new();

    let supervisor = Supervisor::new(&config, battery(&config));
    let input = ScriptedInput::new([KeyCode::Esc], Duration::from_millis(10));

    let termination = tokio::time::timeout(
        RUN_TIMEOUT,
        supervisor.run(Box::new(input), Box::new(recorder.clone())),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(termination, Termination::UserExit);
    assert_eq!(recorder.termination(), Some(Termination::UserExit));
}

#[tokio::test]
async fn exit_signal_stops_idle_dashboard() {
    let config = config(70, 4_000);
    let recorder = RecordingRenderer::new();

    let supervisor = Supervisor::new(&config, battery(&config));
    let exit = supervisor.exit_signal();

    let trigger = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        exit.trigger();
    });

    let termination = tokio::time::timeout(
        RUN_TIMEOUT,
        supervisor.run(
            Box::new(ScriptedInput::empty()),
            Box::new(recorder.clone()),
        ),
    )
    .await
    .unwrap()
    .unwrap();

    trigger.await.unwrap();

    assert_eq!(termination, Termination::UserExit);
    assert!(!recorder.snapshots().is_empty());
    assert!(!recorder.last().unwrap().powered_on);
}

#[tokio::test]
async fn broken_input_ends_run() {
    let config = config(70, 4_000);
    let battery = battery(&config);
    let recorder = RecordingRenderer::new();

    let supervisor = Supervisor::new(&config, battery.clone());

    let termination = tokio::time::timeout(
        RUN_TIMEOUT,
        supervisor.run(Box::new(BrokenInput), Box::new(recorder.clone())),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(termination, Termination::UserExit);
    assert!(battery.start_capacity_decay().is_err());
}
