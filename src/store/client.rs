use async_trait::async_trait;
use k8s_openapi::api::core::v1::{ConfigMap, Node};
use kube::{
	api::{Api, ListParams, PostParams},
	Client,
};

use super::{ObjectStore, Result};

/// Used when configmap has no namespace set, same as kubectl does
const DEFAULT_NAMESPACE: &str = "default";

#[async_trait]
impl ObjectStore for Client {
	async fn get_config_map(&self, namespace: &str, name: &str) -> Result<ConfigMap> {
		let api: Api<ConfigMap> = Api::namespaced(self.clone(), namespace);
		Ok(api.get(name).await?)
	}

	async fn create_config_map(&self, config_map: &ConfigMap) -> Result<()> {
		let namespace = config_map
			.metadata
			.namespace
			.as_deref()
			.unwrap_or(DEFAULT_NAMESPACE);
		let api: Api<ConfigMap> = Api::namespaced(self.clone(), namespace);
		let _created = api.create(&PostParams::default(), config_map).await?;
		Ok(())
	}

	async fn list_nodes(&self) -> Result<Vec<Node>> {
		let api: Api<Node> = Api::all(self.clone());
		Ok(api.list(&ListParams::default()).await?.items)
	}
}
