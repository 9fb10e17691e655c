//! Apple Catch entry point
//!
//! Native: a headless driver that plays one autopilot session against a
//! JSON file store using a simulated 60 Hz frame clock.
//! Web: installs logging and reports the gate state from LocalStorage; the
//! page's renderer drives `MiniGame` itself.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};

    use apple_catch::cooldown::format_mmss;
    use apple_catch::game::{MiniGame, StartError};
    use apple_catch::persistence::JsonFileStore;
    use apple_catch::platform;
    use apple_catch::profile::AppSummary;
    use apple_catch::sim::{GameEvent, PlayArea, TickInput};
    use apple_catch::tuning::Tuning;

    /// Simulated frame length (60 Hz)
    const FRAME_MS: u64 = 16;
    /// Screen width the play area is laid out for
    const DEFAULT_SCREEN_WIDTH: f32 = 390.0;

    #[derive(Debug, Clone, Copy)]
    enum Command {
        Play,
        Status,
        Summary,
    }

    #[derive(Debug)]
    struct Args {
        command: Command,
        store: PathBuf,
        tuning: Option<PathBuf>,
        seed: Option<u64>,
        screen_width: f32,
    }

    fn parse_args() -> Result<Args> {
        let mut args = Args {
            command: Command::Play,
            store: PathBuf::from("apple-catch-store.json"),
            tuning: None,
            seed: None,
            screen_width: DEFAULT_SCREEN_WIDTH,
        };

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "play" => args.command = Command::Play,
                "status" => args.command = Command::Status,
                "summary" => args.command = Command::Summary,
                "--store" => {
                    args.store = iter.next().context("--store needs a path")?.into();
                }
                "--tuning" => {
                    args.tuning = Some(iter.next().context("--tuning needs a path")?.into());
                }
                "--seed" => {
                    let raw = iter.next().context("--seed needs a number")?;
                    args.seed = Some(raw.parse().with_context(|| format!("bad seed '{}'", raw))?);
                }
                "--screen-width" => {
                    let raw = iter.next().context("--screen-width needs a number")?;
                    args.screen_width = raw
                        .parse()
                        .with_context(|| format!("bad screen width '{}'", raw))?;
                }
                other => bail!(
                    "unknown argument '{}' (usage: apple-catch [play|status|summary] \
                     [--store FILE] [--tuning FILE] [--seed N] [--screen-width W])",
                    other
                ),
            }
        }
        Ok(args)
    }

    pub fn run() -> Result<()> {
        platform::init_logging();
        let args = parse_args()?;

        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => Tuning::default(),
        };
        let store = JsonFileStore::open(&args.store)
            .with_context(|| format!("opening store {}", args.store.display()))?;

        match args.command {
            Command::Summary => {
                let summary = AppSummary::load(&store);
                println!("Stars:  {}", summary.stars);
                println!("Quests: {}", summary.quests_count);
                println!("Pet:    {}", summary.pet);
                println!("Level:  {}", summary.level);
                Ok(())
            }
            Command::Status => {
                let area = PlayArea::for_screen(args.screen_width, &tuning);
                let mut game = MiniGame::new(store, tuning, area);
                let status = game.poll_cooldown(platform::now_ms());
                if status.allowed {
                    println!("Ready to play");
                } else {
                    println!("Next play in {}", format_mmss(status.remaining_secs()));
                }
                Ok(())
            }
            Command::Play => play(store, tuning, &args),
        }
    }

    fn play(store: JsonFileStore, tuning: Tuning, args: &Args) -> Result<()> {
        let area = PlayArea::for_screen(args.screen_width, &tuning);
        let mut game = MiniGame::new(store, tuning, area);
        let seed = args.seed.unwrap_or_else(rand::random);

        let mut now = platform::now_ms();
        match game.start(now, seed) {
            Ok(()) => {}
            Err(StartError::CoolingDown { remaining_ms }) => {
                println!("Next play in {}", format_mmss(remaining_ms.div_ceil(1000)));
                return Ok(());
            }
            Err(e) => bail!(e),
        }
        println!("Playing as {} (seed {})", game.skin().as_str(), seed);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        let mut last_shown = u64::MAX;
        loop {
            now += FRAME_MS;
            let Some(report) = game.tick(now, &input) else {
                bail!("session stopped without settling");
            };

            for event in &report.events {
                if let GameEvent::Caught { id, .. } = event {
                    log::debug!("Caught object {}", id);
                }
            }
            if report.remaining_secs != last_shown {
                last_shown = report.remaining_secs;
                println!("Score: {:>3}   Time: {:>2}s", report.score, report.remaining_secs);
            }

            if let Some(settlement) = report.settlement {
                println!("You got +{}★", settlement.reward);
                match (settlement.new_total, &settlement.error) {
                    (Some(total), _) => println!("Total stars: {}", total),
                    (None, Some(e)) => println!("Reward not saved: {}", e),
                    (None, None) => {}
                }
                break;
            }
        }
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    use apple_catch::game::MiniGame;
    use apple_catch::persistence::LocalStorageStore;
    use apple_catch::sim::PlayArea;
    use apple_catch::{Tuning, platform};

    platform::init_logging();
    log::info!("Apple Catch starting...");

    match LocalStorageStore::open() {
        Ok(store) => {
            let tuning = Tuning::default();
            let area = PlayArea::for_screen(390.0, &tuning);
            let mut game = MiniGame::new(store, tuning, area);
            let status = game.poll_cooldown(platform::now_ms());
            log::info!(
                "Cooldown: allowed={} remaining={}s",
                status.allowed,
                status.remaining_secs()
            );
        }
        Err(e) => log::error!("LocalStorage unavailable: {}", e),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
