use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use cli::{BudgetArgs, Command, parse_args};
use log::logger::AdvancedLogger;
use log::{LogLevel, debug, info, warning};
use plategate::api::{Api, Gateway};
use plategate::client::GateClient;
use plategate::conf::{APP_NAME, Conf, load_config};
use plategate::error::GateError;
use plategate::event::{EventStatus, RecognitionEvent};
use plategate::poll::{PollBudget, PollReport};
use plategate::session::{CheckInParams, CorrelationId};
use plategate::sink::{LogSink, Outcome};
use plategate::submit::FileFrameSource;

mod cli;

const EXIT_NOT_FOUND: u8 = 2;
const EXIT_TIMEOUT: u8 = 3;
const EXIT_FAILED: u8 = 4;
const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> Result<ExitCode> {
	let args = parse_args();

	let mut cfg = load_config(args.config.as_deref())?;
	if let Some(url) = args.backend_url {
		cfg.backend_url = url;
	}
	cfg.validate()?;

	let level = if args.debug { LogLevel::Debug } else { cfg.log_level()? };
	AdvancedLogger::init(APP_NAME, level, cfg.log_file)?;
	debug!("Using backend {}", cfg.backend_url);

	let api = Api::new(&cfg.backend_url, cfg.auth(), cfg.request_timeout())
		.context("failed to build the backend client")?;
	let mut client = GateClient::new(Arc::new(api))
		.with_budget(cfg.budget()?)
		.with_events_limit(cfg.events_limit)?;

	match args.command {
		Command::CheckIn {
			card_id,
			lane,
			plate,
			vehicle_type,
			no_watch,
			budget,
		} => {
			let params = CheckInParams {
				card_id,
				lane: lane.or_else(|| cfg.lane.clone()),
				plate_text: plate,
				vehicle_type,
			};
			if no_watch {
				let session = client.check_in(&params).await?;
				println!("{}", session.id);
				return Ok(ExitCode::SUCCESS);
			}

			client = client.with_budget(budget_for(&cfg, &budget)?);
			let session = client.check_in_and_watch(&params, Arc::new(LogSink)).await?;
			println!("session {}", session.id);
			Ok(finish(&mut client, &session.id).await)
		}
		Command::CheckOut { card_id } => {
			client.check_out(&card_id).await?;
			println!("checked out {card_id}");
			Ok(ExitCode::SUCCESS)
		}
		Command::UpdatePlate {
			session_id,
			plate,
			vehicle_type,
		} => {
			client
				.update_plate(&CorrelationId::new(session_id), &plate, &vehicle_type)
				.await?;
			println!("plate updated to {plate}");
			Ok(ExitCode::SUCCESS)
		}
		Command::Events { limit } => {
			let events = client.recent_events(limit.unwrap_or(cfg.events_limit)).await?;
			for event in &events {
				println!("{}", describe_event(event));
			}
			Ok(ExitCode::SUCCESS)
		}
		Command::Capture => {
			let task = client.trigger_capture().await?;
			println!("capture requested: {task}");
			Ok(ExitCode::SUCCESS)
		}
		Command::Recognize { image, budget } => {
			client = client.with_budget(budget_for(&cfg, &budget)?);
			let mut frames = FileFrameSource::new(&image);
			let task = client.recognize(&mut frames, Arc::new(LogSink)).await?;
			println!("task {}", task.id);
			Ok(finish(&mut client, &task.id).await)
		}
	}
}

fn budget_for(cfg: &Conf, overrides: &BudgetArgs) -> plategate::Result<PollBudget> {
	PollBudget::from_millis(
		overrides.interval_ms.unwrap_or(cfg.poll_interval_ms),
		overrides.timeout_ms.unwrap_or(cfg.poll_timeout_ms),
	)
}

/// Wait for the active poll; Ctrl-C cancels it.
async fn finish<G: Gateway>(client: &mut GateClient<G>, id: &CorrelationId) -> ExitCode {
	let report = tokio::select! {
		report = client.wait() => report,
		_ = tokio::signal::ctrl_c() => None,
	};

	match report {
		Some(report) => print_report(report),
		None => {
			client.cancel().await;
			warning!("Stopped watching {id}");
			println!("CANCELLED {id}");
			ExitCode::from(EXIT_INTERRUPTED)
		}
	}
}

fn print_report(report: PollReport) -> ExitCode {
	info!(
		"{} finished after {} probes in {}ms",
		report.id,
		report.attempts.len(),
		report.elapsed.as_millis()
	);
	match report.into_result() {
		Ok(Outcome::Success {
			plate_text,
			member_info,
		}) => {
			let member = member_info
				.as_ref()
				.and_then(|m| m.name.as_deref())
				.unwrap_or("-");
			println!("SUCCESS {plate_text} member={member}");
			ExitCode::SUCCESS
		}
		Ok(Outcome::NotFound) => {
			println!("NOT_FOUND");
			ExitCode::from(EXIT_NOT_FOUND)
		}
		Err(GateError::Timeout(elapsed)) => {
			println!("TIMEOUT after {}ms", elapsed.as_millis());
			ExitCode::from(EXIT_TIMEOUT)
		}
		Ok(Outcome::Error { detail }) => {
			eprintln!("ERROR {detail}");
			ExitCode::from(EXIT_FAILED)
		}
		Ok(Outcome::Timeout) | Err(_) => {
			eprintln!("ERROR unexpected poll result");
			ExitCode::from(EXIT_FAILED)
		}
	}
}

fn describe_event(event: &RecognitionEvent) -> String {
	let detail = match &event.status {
		EventStatus::CheckedIn {
			plate_text,
			vehicle_type,
			..
		} => format!(
			"{} {}",
			plate_text.as_deref().unwrap_or("-"),
			vehicle_type.as_deref().unwrap_or("-")
		),
		EventStatus::CheckedOut { plate_text } => plate_text.as_deref().unwrap_or("-").to_owned(),
		EventStatus::Failed { reason } => reason.as_deref().unwrap_or("-").to_owned(),
		EventStatus::Pending => String::new(),
	};
	let marker = if event.status.is_check_in_terminal() { "*" } else { " " };
	format!(
		"{marker} {} {} {:<11} {} {detail}",
		event.timestamp.format("%Y-%m-%d %H:%M:%S"),
		event.session_id,
		event.status.name(),
		event.lane.as_deref().unwrap_or("-"),
	)
}
