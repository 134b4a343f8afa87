use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about = "Gate client for asynchronous plate recognition", long_about = None)]
pub struct Args {
	/// Configuration file to use instead of the default location
	#[arg(short, long, global = true)]
	pub config: Option<PathBuf>,

	/// Backend base URL, overrides the configuration
	#[arg(short, long, global = true)]
	pub backend_url: Option<String>,

	/// Output debug information
	#[arg(short, long, global = true)]
	pub debug: bool,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
	/// Open a gate session and wait for the plate result
	CheckIn {
		#[arg(long)]
		card_id: Option<String>,

		#[arg(long)]
		lane: Option<String>,

		/// Plate text read by an external source
		#[arg(long)]
		plate: Option<String>,

		#[arg(long)]
		vehicle_type: Option<String>,

		/// Return right after the session is opened
		#[arg(long)]
		no_watch: bool,

		#[command(flatten)]
		budget: BudgetArgs,
	},

	/// Close the session opened with a card
	CheckOut {
		#[arg(long)]
		card_id: String,
	},

	/// Correct the plate of an existing session
	UpdatePlate {
		#[arg(long)]
		session_id: String,

		#[arg(long)]
		plate: String,

		#[arg(long, default_value = "motorbike")]
		vehicle_type: String,
	},

	/// Print the most recent events from the feed
	Events {
		#[arg(short, long)]
		limit: Option<usize>,
	},

	/// Ask the backend to capture a frame on its own camera
	Capture,

	/// Upload a JPEG frame and wait for its recognition task
	Recognize {
		#[arg(short, long)]
		image: PathBuf,

		#[command(flatten)]
		budget: BudgetArgs,
	},
}

/// Overrides of the configured polling budget.
#[derive(clap::Args, Debug, Default, PartialEq)]
pub struct BudgetArgs {
	/// Milliseconds between two probes
	#[arg(long)]
	pub interval_ms: Option<u64>,

	/// Milliseconds before giving up
	#[arg(long)]
	pub timeout_ms: Option<u64>,
}

pub fn parse_args() -> Args {
	Args::parse()
}
