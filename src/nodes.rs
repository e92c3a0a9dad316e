use crate::store::{ObjectStore, Result};

/// `NodeAddress` type of addresses, reachable from outside of cluster
pub const EXTERNAL_IP: &str = "ExternalIP";

/// External addresses of all cluster nodes, in node listing order
pub async fn external_addresses<S: ObjectStore + ?Sized>(store: &S) -> Result<Vec<String>> {
	let nodes = store.list_nodes().await?;
	Ok(nodes
		.into_iter()
		.filter_map(|node| node.status?.addresses)
		.flatten()
		.filter(|address| address.type_ == EXTERNAL_IP)
		.map(|address| address.address)
		.collect())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::store::memory::MemoryStore;
	use k8s_openapi::api::core::v1::{Node, NodeAddress, NodeStatus};

	fn node(addresses: &[(&str, &str)]) -> Node {
		Node {
			status: Some(NodeStatus {
				addresses: Some(
					addresses
						.iter()
						.map(|(type_, address)| NodeAddress {
							address: (*address).to_owned(),
							type_: (*type_).to_owned(),
						})
						.collect(),
				),
				..Default::default()
			}),
			..Default::default()
		}
	}

	#[tokio::test]
	async fn only_external() {
		let store = MemoryStore::with_nodes(vec![
			node(&[
				("InternalIP", "10.0.0.1"),
				("ExternalIP", "203.0.113.1"),
				("Hostname", "worker-1"),
			]),
			Node::default(),
			node(&[("ExternalIP", "203.0.113.2"), ("ExternalIP", "198.51.100.7")]),
		]);

		assert_eq!(
			external_addresses(&store).await.unwrap(),
			vec!["203.0.113.1", "203.0.113.2", "198.51.100.7"]
		);
	}

	#[tokio::test]
	async fn no_external() {
		let store = MemoryStore::with_nodes(vec![node(&[("InternalIP", "10.0.0.1")])]);
		assert!(external_addresses(&store).await.unwrap().is_empty());

		let empty = MemoryStore::default();
		assert!(external_addresses(&empty).await.unwrap().is_empty());
	}
}
