//! Zeni terminal shell
//!
//! Runs the overlay controller headless: surfaces are logged, pointer
//! gestures and messages are typed on stdin, replies are printed.

use anyhow::{Context, Result};
use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use zeni_core::types::{Frame, Origin, PointerPos, SurfaceKind};
use zeni_core::{GestureBinding, HttpBackend, OverlayController, WidgetConfig, WidgetRegistry};

mod commands;
mod terminal;

use commands::{Command, HELP};
use terminal::{DesktopPermissions, LogCompositor, StdoutHost};

const PUMP_INTERVAL: Duration = Duration::from_millis(50);

type Controller = OverlayController<LogCompositor, StdoutHost>;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Zeni shell");

    let config = WidgetConfig::load().context("Failed to load widget config")?;
    info!("Backend: {}", config.backend_url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("zeni-dispatch")
        .enable_all()
        .build()
        .context("Failed to build runtime")?;

    let backend = Arc::new(HttpBackend::new(
        config.backend_url.clone(),
        config.chat_budget,
        config.probe_budget,
    )?);

    let registry = WidgetRegistry::new();
    let mut controller = registry.start(
        &mut DesktopPermissions,
        config,
        backend,
        LogCompositor::default(),
        StdoutHost,
        runtime.handle().clone(),
        Instant::now(),
    )?;

    println!("{}", HELP);
    let lines = spawn_stdin_reader();
    let mut printed = 0;

    loop {
        match lines.recv_timeout(PUMP_INTERVAL) {
            Ok(line) => match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(command) => run(&mut controller, command),
                Err(e) => println!("{}", e),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        controller.pump(Instant::now());
        printed = print_new_messages(&controller, printed);
    }

    registry.stop(&mut controller, Instant::now());
    runtime.shutdown_timeout(Duration::from_secs(1));
    info!("Zeni shell stopped");
    Ok(())
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stdin closed: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn run(controller: &mut Controller, command: Command) {
    let now = Instant::now();
    match command {
        Command::Tap => {
            controller.toggle(now);
        }
        Command::Minimize => {
            controller.minimize(now);
        }
        Command::Close => {
            controller.close(now);
        }
        Command::HandOff => {
            controller.hand_off(now);
        }
        Command::DragTrigger(dx, dy) => {
            if let Some(frame) = controller.trigger_frame() {
                drag(controller, GestureBinding::TriggerMove, frame, dx, dy);
            }
        }
        Command::MovePanel(dx, dy) => match controller.panel_frame() {
            Some(frame) => drag(controller, GestureBinding::HeaderMove, frame, dx, dy),
            None => println!("Panel is not open"),
        },
        Command::Resize(dx, dy) => match controller.panel_frame() {
            Some(frame) => drag(controller, GestureBinding::PanelResize, frame, dx, dy),
            None => println!("Panel is not open"),
        },
        Command::State => print_state(controller),
        Command::Help => println!("{}", HELP),
        Command::Say(text) => {
            if !controller.state().is_panel_visible() {
                println!("Panel is not open (:tap)");
                return;
            }
            controller.set_input(text);
            controller.submit(now);
        }
        Command::Quit => {}
    }
}

/// Replay a straight-line pointer drag starting inside `frame`.
fn drag(controller: &mut Controller, binding: GestureBinding, frame: Frame, dx: f32, dy: f32) {
    let start = PointerPos::new(
        (frame.origin.x + frame.size.width / 2) as f32,
        (frame.origin.y + frame.size.height / 2) as f32,
    );
    let end = PointerPos::new(start.x + dx, start.y + dy);
    let mid = PointerPos::new(start.x + dx / 2.0, start.y + dy / 2.0);

    controller.pointer_down(binding, start, Instant::now());
    controller.pointer_move(binding, mid, Instant::now());
    controller.pointer_move(binding, end, Instant::now());
    controller.pointer_up(binding, end, Instant::now());
}

fn print_state(controller: &Controller) {
    println!(
        "state={:?} expanded={} messages={} in_flight={} session={}",
        controller.state(),
        controller.is_expanded(),
        controller.store().len(),
        controller.in_flight(),
        controller.session_id()
    );
    for surface in [SurfaceKind::Trigger, SurfaceKind::Panel] {
        if let Some(frame) = controller.compositor().frame(surface) {
            println!(
                "  {}: {}x{} at ({}, {})",
                surface, frame.size.width, frame.size.height, frame.origin.x, frame.origin.y
            );
        }
    }
}

fn print_new_messages(controller: &Controller, printed: usize) -> usize {
    let messages = controller.store().messages();
    // The store shrinks only when a close clears it.
    let start = if messages.len() < printed { 0 } else { printed };
    for message in &messages[start..] {
        match message.origin() {
            Origin::User => println!("you> {}", message.text()),
            Origin::Assistant => println!("zeni> {}", message.markup()),
        }
    }
    messages.len()
}
