//! Remote object store, holding toolset configmaps and nodes

mod client;
#[cfg(test)]
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Node};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
	#[error("object not found")]
	NotFound,
	#[error("object already exists")]
	AlreadyExists,
	#[error("kube error: {0}")]
	Other(#[source] kube::Error),
}
pub type Result<T> = std::result::Result<T, StoreError>;

impl From<kube::Error> for StoreError {
	fn from(e: kube::Error) -> Self {
		match e {
			kube::Error::Api(ref response) if response.code == 404 => Self::NotFound,
			kube::Error::Api(ref response)
				if response.code == 409 && response.reason == "AlreadyExists" =>
			{
				Self::AlreadyExists
			}
			e => Self::Other(e),
		}
	}
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
	async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap>;
	/// Namespace is taken from configmap metadata
	async fn create_config_map(&self, config_map: &ConfigMap) -> Result<()>;
	async fn list_nodes(&self) -> Result<Vec<Node>>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for Arc<S> {
	async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap> {
		(**self).get_config_map(namespace, name).await
	}
	async fn create_config_map(&self, config_map: &ConfigMap) -> Result<()> {
		(**self).create_config_map(config_map).await
	}
	async fn list_nodes(&self) -> Result<Vec<Node>> {
		(**self).list_nodes().await
	}
}

#[cfg(test)]
mod tests {
	use super::StoreError;
	use kube::error::ErrorResponse;

	fn api_error(code: u16, reason: &str) -> kube::Error {
		kube::Error::Api(ErrorResponse {
			status: "Failure".to_owned(),
			message: format!("{} test", reason),
			reason: reason.to_owned(),
			code,
		})
	}

	#[test]
	fn classify_api_errors() {
		assert!(matches!(
			StoreError::from(api_error(404, "NotFound")),
			StoreError::NotFound
		));
		assert!(matches!(
			StoreError::from(api_error(409, "AlreadyExists")),
			StoreError::AlreadyExists
		));
		assert!(matches!(
			StoreError::from(api_error(409, "Conflict")),
			StoreError::Other(_)
		));
		assert!(matches!(
			StoreError::from(api_error(503, "ServiceUnavailable")),
			StoreError::Other(_)
		));
	}
}
