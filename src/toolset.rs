//! Toolset configmap bootstrap
//!
//! Every namespace managed by operator should have single toolset configmap,
//! populated with scripts, which are mounted into fabric node pods. Reconcile
//! passes are free to run concurrently, so existence is checked twice: once
//! without any locking, and then under coordination lock, right before
//! creation. Lock is only taken when first check failed, so already
//! bootstrapped namespaces never wait on it.

use std::{
	collections::BTreeMap,
	fs, io,
	path::{Path, PathBuf},
	sync::Arc,
};

use k8s_openapi::{
	api::core::v1::ConfigMap, apimachinery::pkg::apis::meta::v1::ObjectMeta, ByteString,
};
use thiserror::Error;
use tokio::{sync::Mutex, task::JoinError};
use walkdir::WalkDir;

use crate::{
	config::{Config, ReadErrorPolicy},
	store::{ObjectStore, StoreError},
};

#[derive(Error, Debug)]
pub enum ScriptError {
	#[error("failed to walk script directory: {0}")]
	Walk(#[from] walkdir::Error),
	#[error("failed to read script {path}: {source}")]
	Read { path: PathBuf, source: io::Error },
	#[error("script collection task failed: {0}")]
	Task(#[from] JoinError),
}

#[derive(Error, Debug)]
pub enum Error {
	#[error("failed to create toolset {name} in {namespace}: {source}")]
	Create {
		namespace: String,
		name: String,
		source: StoreError,
	},
	#[error("failed to check toolset {name} in {namespace}: {source}")]
	Store {
		namespace: String,
		name: String,
		source: StoreError,
	},
	#[error("failed to collect scripts for toolset {name} in {namespace}: {source}")]
	Scripts {
		namespace: String,
		name: String,
		source: ScriptError,
	},
}
pub type Result<T> = std::result::Result<T, Error>;

/// Toolset configmap contents
#[derive(Default, Debug, PartialEq)]
pub struct Scripts {
	pub data: BTreeMap<String, String>,
	/// Scripts which aren't valid utf-8
	pub binary_data: BTreeMap<String, ByteString>,
}

impl Scripts {
	/// Collects every file under `root`, keyed by file name
	///
	/// Directory structure is flattened, if two files share the same name,
	/// one which comes last in file name order wins.
	pub fn collect(root: &Path) -> std::result::Result<Self, ScriptError> {
		let mut scripts = Self::default();
		for entry in WalkDir::new(root)
			.follow_links(true)
			.sort_by(|a, b| a.file_name().cmp(b.file_name()))
		{
			let entry = entry?;
			if entry.file_type().is_dir() {
				continue;
			}
			let name = entry.file_name().to_string_lossy().into_owned();
			let contents = fs::read(entry.path()).map_err(|source| ScriptError::Read {
				path: entry.path().to_owned(),
				source,
			})?;
			match String::from_utf8(contents) {
				Ok(text) => {
					scripts.binary_data.remove(&name);
					scripts.data.insert(name, text);
				}
				Err(e) => {
					scripts.data.remove(&name);
					scripts.binary_data.insert(name, ByteString(e.into_bytes()));
				}
			}
		}
		Ok(scripts)
	}
}

/// Makes sure toolset configmap exists
pub struct Toolset<S> {
	store: S,
	lock: Arc<Mutex<()>>,
	name: String,
	script_root: PathBuf,
	read_errors: ReadErrorPolicy,
}

impl<S: ObjectStore> Toolset<S> {
	/// Every [`Toolset`] sharing the same `lock` will never race on creation
	pub fn new(store: S, lock: Arc<Mutex<()>>, config: &Config) -> Self {
		Self {
			store,
			lock,
			name: config.toolset_name.clone(),
			script_root: config.script_root.clone(),
			read_errors: config.read_errors,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Build toolset configmap for namespace from current script directory contents
	///
	/// Script directory is read on blocking thread pool.
	pub async fn build(&self, namespace: &str) -> Result<ConfigMap> {
		let root = self.script_root.clone();
		let scripts = tokio::task::spawn_blocking(move || Scripts::collect(&root))
			.await
			.map_err(ScriptError::from)
			.and_then(|scripts| scripts)
			.map_err(|source| Error::Scripts {
				namespace: namespace.to_owned(),
				name: self.name.clone(),
				source,
			})?;
		Ok(ConfigMap {
			metadata: ObjectMeta {
				name: Some(self.name.clone()),
				namespace: Some(namespace.to_owned()),
				..Default::default()
			},
			data: Some(scripts.data),
			binary_data: if scripts.binary_data.is_empty() {
				None
			} else {
				Some(scripts.binary_data)
			},
			..Default::default()
		})
	}

	/// Create toolset configmap in namespace, unless it is already there
	///
	/// Safe to call concurrently and repeatedly, only failed creation and
	/// (with [`ReadErrorPolicy::Propagate`]) failed existence check are
	/// reported as errors.
	pub async fn ensure(&self, namespace: &str) -> Result<()> {
		if self.store.get_config_map(namespace, &self.name).await.is_ok() {
			log::debug!("Toolset {} already exists in {}", self.name, namespace);
			return Ok(());
		}

		let _guard = self.lock.lock().await;
		match self.store.get_config_map(namespace, &self.name).await {
			Ok(_) => {
				log::debug!("Toolset {} was created in {} concurrently", self.name, namespace);
				Ok(())
			}
			Err(StoreError::NotFound) => self.create(namespace).await,
			Err(e) => match self.read_errors {
				ReadErrorPolicy::Propagate => {
					log::error!(
						"Failed to check toolset {} in {}: {}",
						self.name,
						namespace,
						e
					);
					Err(Error::Store {
						namespace: namespace.to_owned(),
						name: self.name.clone(),
						source: e,
					})
				}
				ReadErrorPolicy::AssumePresent => {
					log::warn!(
						"Failed to check toolset {} in {}, assuming it exists: {}",
						self.name,
						namespace,
						e
					);
					Ok(())
				}
			},
		}
	}

	async fn create(&self, namespace: &str) -> Result<()> {
		log::info!("Toolset {} not found in {}, creating", self.name, namespace);
		let config_map = self.build(namespace).await.map_err(|e| {
			log::error!("{}", e);
			e
		})?;
		match self.store.create_config_map(&config_map).await {
			Ok(()) => Ok(()),
			Err(StoreError::AlreadyExists) => {
				log::debug!("Toolset {} was created in {} elsewhere", self.name, namespace);
				Ok(())
			}
			Err(e) => {
				log::error!(
					"Failed to create toolset {} in {}: {}",
					self.name,
					namespace,
					e
				);
				Err(Error::Create {
					namespace: namespace.to_owned(),
					name: self.name.clone(),
					source: e,
				})
			}
		}
	}
}
