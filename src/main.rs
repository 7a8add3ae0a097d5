use std::{sync::Arc, thread, time::Duration};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crossbeam::channel;
use rand::{rngs::SmallRng, SeedableRng};

use prize_wheel::{
    animation::FrameDriver,
    draw::WeightedDraw,
    round::{Round, RoundStatus},
    segment::SegmentTable,
    sound::{Jukebox, Sound},
    Params, SpinMode, DEFAULT_PARAMS,
};

// Draws per stats job
const STATS_BATCH: usize = 10_000;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Headless prize wheel simulator.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Whole turns per spin
    #[arg(long, global = true)]
    pub full_rotations: Option<u32>,
    /// Maximum landing jitter either side of the segment centre, in degrees
    #[arg(long, global = true)]
    pub max_variance: Option<f64>,
    /// Spin animation length in milliseconds
    #[arg(long, global = true)]
    pub spin_ms: Option<u64>,
    /// Seed for reproducible runs
    #[arg(long, global = true)]
    pub seed: Option<u64>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Play full rounds: spin, count up the prize, reset
    Play {
        #[arg(short, long, default_value_t = 1)]
        rounds: usize,
        /// weighted, random, or a segment id
        #[arg(short, long, default_value = "weighted")]
        cheat: SpinMode,
        /// Frame length in milliseconds
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
    },
    /// Compare weighted draw frequencies against the configured weights
    Stats {
        #[arg(short, long, default_value_t = 1_000_000)]
        trials: usize,
    },
}

impl Args {
    fn params(&self) -> Params {
        let mut params = DEFAULT_PARAMS.clone();
        if let Some(full_rotations) = self.full_rotations {
            params.full_rotations = full_rotations;
        }
        if let Some(max_variance) = self.max_variance {
            params.max_variance_deg = max_variance;
        }
        if let Some(spin_ms) = self.spin_ms {
            params.spin_duration = Duration::from_millis(spin_ms);
        }
        params
    }
}

fn make_rng(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    log::set_max_level(log::LevelFilter::Trace);
    env_logger::builder()
        .filter(None, log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let params = args.params();
    params.validate().context("invalid wheel parameters")?;
    log::info!("{}", params);

    match args.command {
        Command::Play { rounds, cheat, frame_ms } => {
            play(&params, rounds, cheat, Duration::from_millis(frame_ms), args.seed)
        }
        Command::Stats { trials } => stats(&params, trials, args.seed),
    }
}

/// Plays `rounds` rounds on the frame driver and prints a summary line.
fn play(params: &Params, rounds: usize, cheat: SpinMode, frame: Duration, seed: Option<u64>) -> anyhow::Result<()> {
    if frame.is_zero() {
        bail!("frame length must be positive");
    }
    let mut round = Round::new(params, make_rng(seed))?;
    round.cheats_mut().select(cheat).context("selecting cheat")?;
    log::info!("Cheat: {}", round.cheats().label());

    let mut driver = FrameDriver::new();
    let mut sounds = Jukebox::with_all();
    let mut wins = Vec::with_capacity(rounds);
    let mut frames = 0usize;

    for i in 0..rounds {
        let outcome = round.start(&mut driver).with_context(|| format!("starting round {}", i))?;
        log::debug!("Round {} heading for {}", i, outcome.segment);

        let won = 'frames: loop {
            for event in driver.step(frame) {
                if let RoundStatus::Finished { won, .. } = round.handle(event, &mut driver, &mut sounds) {
                    break 'frames won;
                }
            }
            frames += 1;
            if driver.is_idle() {
                bail!("animations stopped before round {} finished", i);
            }
        };
        log::info!("Round {}: won {} ({})", i, won, round.balance().display());
        wins.push(won);
    }

    println!(
        "{}",
        format!(
            r#"{{"Rounds": {}, "Cheat": "{}", "Wins": {:?}, "Balance": {}, "Frames": {}, "Clicks": {}}}"#,
            rounds,
            cheat,
            wins,
            round.balance().balance(),
            frames,
            sounds.count(Sound::Click),
        )
    );
    Ok(())
}

/// Runs `trials` weighted draws across worker threads and prints observed vs
/// expected frequency per segment.
fn stats(params: &Params, trials: usize, seed: Option<u64>) -> anyhow::Result<()> {
    let table = SegmentTable::new(&params.prizes, params.segment_count)?;
    let draw = Arc::new(WeightedDraw::new(&table.weights())?);
    let n_segments = table.len();

    // Queue batches up front; each batch gets its own seed so results do not
    // depend on scheduling
    let (job_tx, job_rx) = channel::unbounded();
    for (i, start) in (0..trials).step_by(STATS_BATCH).enumerate() {
        job_tx.send((i as u64, STATS_BATCH.min(trials - start)))?;
    }
    drop(job_tx);

    let (res_tx, res_rx) = channel::unbounded();
    let n_threads = num_cpus::get_physical().max(1);
    let mut workers = Vec::with_capacity(n_threads);
    for _ in 0..n_threads {
        let draw = draw.clone();
        let job_rx = job_rx.clone();
        let res_tx = res_tx.clone();
        workers.push(thread::spawn(move || {
            while let Ok((batch, n)) = job_rx.recv() {
                let mut rng = make_rng(seed.map(|s| s.wrapping_add(batch)));
                let mut counts = vec![0u64; draw.len()];
                for _ in 0..n {
                    counts[draw.sample(&mut rng)] += 1;
                }
                log::trace!("Batch {} done", batch);
                if res_tx.send(counts).is_err() {
                    break;
                }
            }
        }));
    }
    drop(res_tx);

    let mut totals = vec![0u64; n_segments];
    for counts in res_rx.iter() {
        for (total, count) in totals.iter_mut().zip(counts) {
            *total += count;
        }
    }
    for worker in workers {
        if worker.join().is_err() {
            bail!("stats worker panicked");
        }
    }

    println!("{:>4} {:>6} {:>9} {:>9}", "id", "value", "observed", "expected");
    for segment in table.segments() {
        let observed = totals[segment.id] as f64 / trials.max(1) as f64;
        println!(
            "{:>4} {:>6} {:>9.4} {:>9.4}",
            segment.id,
            segment.value,
            observed,
            draw.probability(segment.id)
        );
    }
    log::info!("{} draws on {} threads", trials, n_threads);
    Ok(())
}
