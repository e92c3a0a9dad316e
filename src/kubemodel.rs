use std::fmt::{self, Display};

/// Identifies object type in cluster
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct GroupVersionKind {
	/// Empty for core objects
	pub group: String,
	pub version: String,
	pub kind: String,
}

impl GroupVersionKind {
	/// Kind of statically known k8s-openapi resource
	pub fn of<K: k8s_openapi::Resource>() -> Self {
		Self {
			group: K::GROUP.to_owned(),
			version: K::VERSION.to_owned(),
			kind: K::KIND.to_owned(),
		}
	}

	/// Parses `apiVersion` field, which is either `version` or `group/version`
	pub fn from_api_version(api_version: &str, kind: &str) -> Self {
		let (group, version) = match api_version.rfind('/') {
			Some(idx) => (&api_version[..idx], &api_version[idx + 1..]),
			None => ("", api_version),
		};
		Self {
			group: group.to_owned(),
			version: version.to_owned(),
			kind: kind.to_owned(),
		}
	}

	pub fn api_version(&self) -> String {
		if self.group.is_empty() {
			self.version.clone()
		} else {
			format!("{}/{}", self.group, self.version)
		}
	}
}

impl Display for GroupVersionKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} {}", self.api_version(), self.kind)
	}
}
