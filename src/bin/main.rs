#![warn(rust_2018_idioms)]

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        mpsc, Arc, Condvar, Mutex,
    },
    time::Duration,
};

use anyhow::{Context, Result};
use batmon::{
    collection::Collector,
    constants::TICK_RATE_IN_MILLISECONDS,
    create_collection_thread,
    daemon::Daemon,
    engine::{pattern::LogIndicator, BARS_MAX},
    event::BatmonEvent,
    options,
    registry::PropertyTable,
    signals::{LogBus, LogPowerControl},
};

fn main() -> Result<()> {
    let args = options::args::get_args();

    #[cfg(all(feature = "logging", debug_assertions))]
    {
        batmon::utils::logging::init_logger(log::LevelFilter::Debug, None)
            .context("Unable to initialize the logger.")?;
    }

    let config_path = options::get_config_path(args.general_args.config_location.as_deref());
    let config = options::create_or_get_config(&config_path)
        .context("Unable to properly parse or create the config file.")?;
    let settings = options::init_settings(&args, &config)
        .context("Found an issue while resolving the daemon settings.")?;

    let mut daemon = Daemon::new(
        PropertyTable::new(),
        LogBus,
        LogIndicator,
        LogPowerControl,
    );
    daemon
        .startup()
        .context("Unable to publish the startup property defaults.")?;

    let mut collector = Collector::new(settings.sources.clone());

    if settings.oneshot {
        collector.init();
        let telemetry = collector.poll();
        if let Err(err) = daemon.on_sample(telemetry) {
            log::warn!("poll cycle completed degraded: {err}");
        }
        let state = daemon.state();
        println!(
            "capacity: {}% ({}), bars: {}/{}, charger: {}",
            state.capacity_percent,
            state.capacity_state.as_str(),
            state.bars,
            BARS_MAX,
            if state.charger_connected {
                "connected"
            } else {
                "disconnected"
            },
        );
        return Ok(());
    }

    // Create termination mutex and cvar
    #[allow(clippy::mutex_atomic)]
    let thread_termination_lock = Arc::new(Mutex::new(false));
    let thread_termination_cvar = Arc::new(Condvar::new());

    let (sender, receiver) = mpsc::channel();
    let _collection_thread = create_collection_thread(
        sender.clone(),
        thread_termination_lock.clone(),
        thread_termination_cvar.clone(),
        collector,
        settings.poll_rate,
    );

    // Set termination hook
    let is_terminated = Arc::new(AtomicBool::new(false));
    let ist_clone = is_terminated.clone();
    ctrlc::set_handler(move || {
        ist_clone.store(true, Ordering::SeqCst);
        let _ = sender.send(BatmonEvent::Terminate);
    })?;

    while !is_terminated.load(Ordering::SeqCst) {
        if let Ok(recv) = receiver.recv_timeout(Duration::from_millis(TICK_RATE_IN_MILLISECONDS)) {
            match recv {
                BatmonEvent::Update(telemetry) => {
                    if let Err(err) = daemon.on_sample(*telemetry) {
                        log::warn!("poll cycle completed degraded: {err}");
                    }
                }
                BatmonEvent::Request(request) => {
                    if let Err(err) = daemon.handle_request(request) {
                        log::warn!("info request failed: {err}");
                    }
                }
                BatmonEvent::Terminate => break,
            }
        }
    }

    // I think doing it in this order is safe...

    *thread_termination_lock.lock().unwrap() = true;

    thread_termination_cvar.notify_all();

    Ok(())
}
