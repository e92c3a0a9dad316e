use std::sync::Arc;

use clap::{Parser, Subcommand};
use fabric_bootstrap::{external_addresses, Config, ReadErrorPolicy, Templates, Toolset};
use kube::Client;
use tokio::sync::Mutex;

#[derive(Parser)]
#[clap(version, author = "Lach")]
struct Opts {
	/// Directory with managed object templates
	#[clap(long, env = "FABRIC_TEMPLATE_ROOT", default_value = "")]
	template_root: String,
	/// Directory with scripts, published as toolset configmap
	#[clap(long, env = "FABRIC_SCRIPT_ROOT", default_value = "")]
	script_root: String,
	/// Name of toolset configmap
	#[clap(long, env = "FABRIC_TOOLSET_NAME", default_value = "")]
	toolset_name: String,
	/// Report success if toolset existence can't be checked
	#[clap(long, env = "FABRIC_ASSUME_PRESENT_ON_READ_ERROR")]
	assume_present_on_read_error: bool,
	#[clap(subcommand)]
	sub: SubCommand,
}

impl Opts {
	fn config(&self) -> Config {
		Config::resolved(
			&self.template_root,
			&self.script_root,
			&self.toolset_name,
			if self.assume_present_on_read_error {
				ReadErrorPolicy::AssumePresent
			} else {
				ReadErrorPolicy::Propagate
			},
		)
	}
}

#[derive(Subcommand)]
enum SubCommand {
	/// Create toolset configmap in namespace, unless it already exists
	Ensure {
		#[clap(long, short)]
		namespace: String,
	},
	/// Decode template and print resulting object
	Template { name: String },
	/// List external addresses of cluster nodes
	NodeAddresses,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let opts = Opts::parse();
	let config = opts.config();

	match opts.sub {
		SubCommand::Ensure { namespace } => {
			let client = Client::try_default().await?;
			let toolset = Toolset::new(client, Arc::new(Mutex::new(())), &config);
			toolset.ensure(&namespace).await?;
			log::info!("Toolset {} is present in {}", toolset.name(), namespace);
		}
		SubCommand::Template { name } => {
			let templates = Templates::new(&config.template_root);
			let (object, kind) = templates.load(&name)?;
			log::info!("Loaded {} from {}", kind, templates.root().display());
			println!("{}", serde_json::to_string_pretty(&object)?);
		}
		SubCommand::NodeAddresses => {
			let client = Client::try_default().await?;
			for address in external_addresses(&client).await? {
				println!("{}", address);
			}
		}
	}
	Ok(())
}
