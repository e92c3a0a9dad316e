//! In-process store used by tests

use std::{
	collections::BTreeMap,
	sync::{
		atomic::{AtomicUsize, Ordering},
		Mutex,
	},
};

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Node};
use kube::error::ErrorResponse;

use super::{ObjectStore, Result, StoreError};

/// How next create call should misbehave
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CreateFault {
	/// Someone outside of this process created object just before us
	CreatedElsewhere,
	Unavailable,
}

pub fn unavailable() -> StoreError {
	StoreError::Other(kube::Error::Api(ErrorResponse {
		status: "Failure".to_owned(),
		message: "etcdserver: request timed out".to_owned(),
		reason: "ServiceUnavailable".to_owned(),
		code: 503,
	}))
}

#[derive(Default)]
pub struct MemoryStore {
	config_maps: Mutex<BTreeMap<(String, String), ConfigMap>>,
	nodes: Vec<Node>,
	failing_gets: AtomicUsize,
	create_fault: Mutex<Option<CreateFault>>,
	gets: AtomicUsize,
	create_attempts: AtomicUsize,
	creates: AtomicUsize,
}

fn key(config_map: &ConfigMap) -> (String, String) {
	(
		config_map.metadata.namespace.clone().unwrap_or_default(),
		config_map.metadata.name.clone().unwrap_or_default(),
	)
}

impl MemoryStore {
	pub fn with_nodes(nodes: Vec<Node>) -> Self {
		Self {
			nodes,
			..Default::default()
		}
	}

	/// Next `count` get calls will fail with non-NotFound error
	pub fn fail_gets(&self, count: usize) {
		self.failing_gets.store(count, Ordering::SeqCst);
	}

	pub fn fail_next_create(&self, fault: CreateFault) {
		*self.create_fault.lock().unwrap() = Some(fault);
	}

	pub fn insert(&self, config_map: ConfigMap) {
		self.config_maps
			.lock()
			.unwrap()
			.insert(key(&config_map), config_map);
	}

	pub fn config_map(&self, namespace: &str, name: &str) -> Option<ConfigMap> {
		self.config_maps
			.lock()
			.unwrap()
			.get(&(namespace.to_owned(), name.to_owned()))
			.cloned()
	}

	pub fn len(&self) -> usize {
		self.config_maps.lock().unwrap().len()
	}

	pub fn gets(&self) -> usize {
		self.gets.load(Ordering::SeqCst)
	}

	pub fn create_attempts(&self) -> usize {
		self.create_attempts.load(Ordering::SeqCst)
	}

	/// Number of create calls, which actually stored something
	pub fn creates(&self) -> usize {
		self.creates.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ObjectStore for MemoryStore {
	async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap> {
		self.gets.fetch_add(1, Ordering::SeqCst);
		// Let concurrent callers interleave, as they would do on network call
		tokio::task::yield_now().await;
		let failing = self
			.failing_gets
			.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
			.is_ok();
		if failing {
			return Err(unavailable());
		}
		self.config_map(namespace, name).ok_or(StoreError::NotFound)
	}

	async fn create_config_map(&self, config_map: &ConfigMap) -> Result<()> {
		self.create_attempts.fetch_add(1, Ordering::SeqCst);
		tokio::task::yield_now().await;
		let fault = self.create_fault.lock().unwrap().take();
		match fault {
			Some(CreateFault::Unavailable) => return Err(unavailable()),
			Some(CreateFault::CreatedElsewhere) => {
				self.insert(config_map.clone());
				return Err(StoreError::AlreadyExists);
			}
			None => {}
		}

		let mut config_maps = self.config_maps.lock().unwrap();
		let key = key(config_map);
		if config_maps.contains_key(&key) {
			return Err(StoreError::AlreadyExists);
		}
		config_maps.insert(key, config_map.clone());
		self.creates.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}

	async fn list_nodes(&self) -> Result<Vec<Node>> {
		Ok(self.nodes.clone())
	}
}
