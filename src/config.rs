use std::path::PathBuf;

use crate::defaults::resolve;

/// Root directory where all needed templates live
pub const DEFAULT_TEMPLATE_ROOT: &str = "/usr/local/bin/templates/";
/// Directory, which contents are published as toolset configmap
pub const DEFAULT_SCRIPT_ROOT: &str = "/usr/local/bin/scripts";
pub const DEFAULT_TOOLSET_NAME: &str = "fabric-toolset";

/// What to do when toolset existence can't be checked for reason other than absence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadErrorPolicy {
	/// Fail reconcile pass, so it will be retried
	Propagate,
	/// Assume toolset exists and report success
	AssumePresent,
}

impl Default for ReadErrorPolicy {
	fn default() -> Self {
		Self::Propagate
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	pub template_root: PathBuf,
	pub script_root: PathBuf,
	pub toolset_name: String,
	pub read_errors: ReadErrorPolicy,
}

impl Default for Config {
	fn default() -> Self {
		Self::resolved("", "", "", ReadErrorPolicy::default())
	}
}

impl Config {
	/// Empty values are replaced with defaults
	pub fn resolved(
		template_root: &str,
		script_root: &str,
		toolset_name: &str,
		read_errors: ReadErrorPolicy,
	) -> Self {
		Self {
			template_root: resolve(template_root, DEFAULT_TEMPLATE_ROOT).into(),
			script_root: resolve(script_root, DEFAULT_SCRIPT_ROOT).into(),
			toolset_name: resolve(toolset_name, DEFAULT_TOOLSET_NAME).to_owned(),
			read_errors,
		}
	}
}
