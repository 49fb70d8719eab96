//! Terminal host shell.
//!
//! Owns the peripherals and the 1 Hz tick source. Ticks drive the alarm
//! evaluator on this control thread; stdin lines are shell commands, and
//! anything that is not a command is handed to the voice layer as an
//! alarm-setting utterance. The tick handler never blocks on the network.

use crossbeam::channel::{unbounded, Receiver};
use deskmate::alarms::ring::RingConfig;
use deskmate::alarms::EngineEvent;
use deskmate::hardware::{AudioPlayer, ConsoleDisplay, DisplayPort, NullPlayer, RodioPlayer};
use deskmate::voice::VoiceParseError;
use deskmate::{
    AlarmEvaluator, AlarmStore, AssistantConfig, ClockDisplayLoop, RingController, TimeResolver,
    VoiceCommandParser,
};
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Assembled engine plus the collaborators the host owns.
pub struct DeskmateApp {
    store: Arc<Mutex<AlarmStore>>,
    resolver: Arc<TimeResolver>,
    ring: Arc<RingController>,
    evaluator: AlarmEvaluator,
    clock_loop: ClockDisplayLoop,
    events: Receiver<EngineEvent>,
}

impl DeskmateApp {
    /// Wire the engine from configuration.
    pub fn new(config: AssistantConfig) -> anyhow::Result<Self> {
        let resolver = Arc::new(TimeResolver::new(
            &config.clock.home_timezone,
            config.clock.time_api_key.clone(),
        )?);

        let display: Arc<dyn DisplayPort> = Arc::new(ConsoleDisplay::new());

        let player: Arc<dyn AudioPlayer> = match RodioPlayer::new() {
            Ok(player) => Arc::new(player),
            Err(e) => {
                tracing::warn!("no audio device ({e}), alarms will ring silently");
                Arc::new(NullPlayer::new())
            }
        };

        let ring_config = RingConfig {
            sound_dir: config.sound_dir(),
            ramp_start_volume: config.audio.ramp_start_volume,
            ramp_step: config.audio.ramp_step,
            ramp_interval: Duration::from_secs(config.audio.ramp_interval_secs),
            snooze_max: config.snooze.max_count,
            ..Default::default()
        };

        let store = Arc::new(Mutex::new(AlarmStore::new()));
        let ring = Arc::new(RingController::new(
            store.clone(),
            player,
            display.clone(),
            ring_config,
        ));
        let events = ring.subscribe();

        let evaluator = AlarmEvaluator::new(store.clone(), ring.clone(), resolver.clone());
        let clock_loop = ClockDisplayLoop::new(display, resolver.clone());

        Ok(Self {
            store,
            resolver,
            ring,
            evaluator,
            clock_loop,
            events,
        })
    }

    /// Run the shell until the user quits or stdin closes.
    pub fn run(&self) -> anyhow::Result<()> {
        let ticks = crossbeam::channel::tick(Duration::from_secs(1));
        let lines = spawn_stdin_reader();

        println!("Deskmate ready. Commands: time <place>, alarms, delete <n>,");
        println!("clock on|off, volume up|down, stop, snooze, quit.");
        println!("Anything else is treated as an alarm request (e.g. \"đặt báo thức lúc 7 giờ 30 sáng\").");

        loop {
            crossbeam::select! {
                recv(ticks) -> _ => {
                    self.evaluator.tick();
                    self.drain_events();
                }
                recv(lines) -> line => {
                    match line {
                        Ok(line) => {
                            if !self.handle_line(line.trim()) {
                                break;
                            }
                        }
                        Err(_) => break,
                    }
                }
            }
        }

        self.clock_loop.stop();
        self.ring.stop();
        Ok(())
    }

    fn drain_events(&self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                EngineEvent::RingStarted { name, .. } => {
                    println!(">> Báo thức \"{name}\" đang kêu! (stop / snooze)");
                }
                EngineEvent::RingStopped { .. } => {
                    println!(">> Báo thức đã tắt.");
                }
            }
        }
    }

    /// Handle one input line. Returns `false` to quit.
    fn handle_line(&self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }

        match line {
            "quit" | "exit" => return false,
            "alarms" => self.print_alarms(),
            "clock on" => self.clock_loop.start(),
            "clock off" => self.clock_loop.stop(),
            "volume up" => println!("Volume: {:.1}", self.ring.adjust_volume(true)),
            "volume down" => println!("Volume: {:.1}", self.ring.adjust_volume(false)),
            "stop" => {
                if !self.ring.stop() {
                    println!("Hiện không có báo thức nào đang kêu.");
                }
            }
            "snooze" => self.snooze_current(),
            _ => {
                if let Some(rest) = line.strip_prefix("time ") {
                    self.print_time(rest);
                } else if let Some(rest) = line.strip_prefix("delete ") {
                    self.delete_alarm(rest);
                } else if let Some(reply) = self.ring.handle_stop_phrase(line) {
                    println!("{reply}");
                } else {
                    self.create_alarm_from_utterance(line);
                }
            }
        }

        true
    }

    fn print_alarms(&self) {
        let store = self.store.lock().unwrap();
        if store.is_empty() {
            println!("Chưa có báo thức nào.");
            return;
        }
        for (index, (_, alarm)) in store.list().iter().enumerate() {
            println!("{}. {}", index + 1, alarm.summary());
        }
    }

    fn print_time(&self, location: &str) {
        match self.resolver.resolve(location) {
            Ok(resolved) => println!("{}", resolved.summary()),
            Err(e) => println!("Không tra được giờ: {e}"),
        }
    }

    fn delete_alarm(&self, index: &str) {
        let Ok(index) = index.trim().parse::<usize>() else {
            println!("Cách dùng: delete <số thứ tự>");
            return;
        };

        let id = {
            let store = self.store.lock().unwrap();
            store.list().get(index.wrapping_sub(1)).map(|(id, _)| *id)
        };

        match id {
            Some(id) => {
                // A ringing alarm must be silenced before removal.
                if self.ring.current_alarm() == Some(id) {
                    self.ring.stop();
                }
                self.store.lock().unwrap().delete(id);
                println!("Đã xoá báo thức số {index}.");
            }
            None => println!("Không có báo thức số {index}."),
        }
    }

    fn snooze_current(&self) {
        let Some(id) = self.ring.current_alarm() else {
            println!("Hiện không có báo thức nào đang kêu.");
            return;
        };
        let now = self.resolver.home_now().naive_local();
        if self.ring.snooze(id, now) {
            println!("Đã hoãn báo thức.");
        } else {
            println!("Không hoãn được nữa (đã đạt giới hạn hoặc bị tắt).");
        }
    }

    fn create_alarm_from_utterance(&self, utterance: &str) {
        let today = self.resolver.home_now().date_naive();
        let mut store = self.store.lock().unwrap();

        match VoiceCommandParser::parse(utterance, &store, today) {
            Ok(request) => {
                let time = request.time;
                let name = request.name.clone();
                store.add(request.into_spec());
                println!(
                    "Đã đặt báo thức \"{name}\" lúc {}.",
                    time.format("%H:%M")
                );
            }
            Err(VoiceParseError::TimeNotRecognized) => {
                println!("Không nhận ra giờ báo thức trong câu đó.");
            }
            Err(VoiceParseError::InvalidDate(date)) => {
                println!("Ngày không hợp lệ: {date}.");
            }
        }
    }
}

/// Forward stdin lines over a channel so the shell can select on them.
fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    let spawned = std::thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!("failed to spawn stdin reader: {e}");
    }
    rx
}
