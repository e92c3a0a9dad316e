//! Loading of managed object templates
//!
//! Templates are YAML (or JSON) documents describing single kubernetes object.
//! Object schema is selected by `apiVersion` and `kind` of the document itself,
//! so callers don't need to know what kind of object template contains.

use std::{
	fs, io,
	path::{Component, Path, PathBuf},
};

use k8s_openapi::api::{
	apps::v1::{DaemonSet, Deployment, ReplicaSet, StatefulSet},
	batch::{v1::Job, v1beta1::CronJob},
	core::v1::{
		ConfigMap, Endpoints, Namespace, PersistentVolume, PersistentVolumeClaim, Pod, Secret,
		Service, ServiceAccount,
	},
	networking::v1::{Ingress, NetworkPolicy},
	rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_yaml_with_quirks::DeserializingQuirks;
use thiserror::Error;

use crate::kubemodel::GroupVersionKind;

#[derive(Error, Debug)]
pub enum DecodeError {
	#[error("template is empty")]
	Empty,
	#[error("template is not valid utf-8: {0}")]
	Utf8(#[from] std::str::Utf8Error),
	#[error("failed to parse yaml: {0}")]
	Yaml(#[from] serde_yaml_with_quirks::Error),
	#[error("missing field: {0}")]
	MissingField(&'static str),
	#[error("unknown object kind: {0}")]
	UnknownKind(GroupVersionKind),
	#[error("object doesn't match {kind} schema: {source}")]
	Schema {
		kind: GroupVersionKind,
		source: serde_json::Error,
	},
	#[error("expected {expected}, found {found}")]
	KindMismatch {
		expected: GroupVersionKind,
		found: GroupVersionKind,
	},
}

#[derive(Error, Debug)]
pub enum TemplateError {
	#[error("template name should be relative path inside template root: {0}")]
	InvalidName(String),
	#[error("template not found: {0}")]
	NotFound(PathBuf),
	#[error("failed to read template {path}: {source}")]
	Io { path: PathBuf, source: io::Error },
	#[error("failed to decode template {path}: {source}")]
	Decode { path: PathBuf, source: DecodeError },
}
pub type Result<T, E = TemplateError> = std::result::Result<T, E>;

/// Object type, which can be instantiated from template
pub trait TemplateObject: Sized {
	/// Returns object back if it has another kind
	fn from_decoded(object: DecodedObject) -> std::result::Result<Self, DecodedObject>;
}

macro_rules! decoded_objects {
	($($kind:ident),+ $(,)?) => {
		/// Object decoded from template
		#[derive(Clone, Debug, PartialEq, Serialize)]
		#[serde(untagged)]
		pub enum DecodedObject {
			$($kind($kind),)+
		}

		impl DecodedObject {
			pub fn kind(&self) -> GroupVersionKind {
				match self {
					$(Self::$kind(_) => GroupVersionKind::of::<$kind>(),)+
				}
			}

			fn from_value(kind: &GroupVersionKind, value: Value) -> Result<Self, DecodeError> {
				$(
					if *kind == GroupVersionKind::of::<$kind>() {
						return serde_json::from_value(value)
							.map(Self::$kind)
							.map_err(|source| DecodeError::Schema {
								kind: kind.clone(),
								source,
							});
					}
				)+
				Err(DecodeError::UnknownKind(kind.clone()))
			}
		}

		$(
			impl TemplateObject for $kind {
				fn from_decoded(object: DecodedObject) -> std::result::Result<Self, DecodedObject> {
					match object {
						DecodedObject::$kind(object) => Ok(object),
						other => Err(other),
					}
				}
			}

			impl From<$kind> for DecodedObject {
				fn from(object: $kind) -> Self {
					Self::$kind(object)
				}
			}
		)+
	};
}

decoded_objects!(
	ConfigMap,
	Secret,
	Service,
	ServiceAccount,
	Endpoints,
	Namespace,
	Pod,
	PersistentVolume,
	PersistentVolumeClaim,
	Deployment,
	StatefulSet,
	DaemonSet,
	ReplicaSet,
	Job,
	CronJob,
	Ingress,
	NetworkPolicy,
	Role,
	RoleBinding,
	ClusterRole,
	ClusterRoleBinding,
);

fn field<'v>(value: &'v Value, name: &'static str) -> Result<&'v str, DecodeError> {
	value
		.get(name)
		.and_then(Value::as_str)
		.ok_or(DecodeError::MissingField(name))
}

/// Decode object, discovering its kind from payload
///
/// Only first non-empty document of multi-document payload is decoded, rest
/// of them are ignored.
pub fn decode(bytes: &[u8]) -> Result<(DecodedObject, GroupVersionKind), DecodeError> {
	let text = std::str::from_utf8(bytes)?;
	if text.trim().is_empty() {
		return Err(DecodeError::Empty);
	}

	let mut first = None;
	for document in serde_yaml_with_quirks::Deserializer::from_str_with_quirks(
		text,
		DeserializingQuirks { old_octals: true },
	) {
		let value = Value::deserialize(document)?;
		if !value.is_null() {
			first = Some(value);
			break;
		}
	}
	let value = first.ok_or(DecodeError::Empty)?;

	let kind = GroupVersionKind::from_api_version(field(&value, "apiVersion")?, field(&value, "kind")?);
	let object = DecodedObject::from_value(&kind, value)?;
	Ok((object, kind))
}

/// Template directory
#[derive(Clone, Debug)]
pub struct Templates {
	root: PathBuf,
}

impl Templates {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Path of template, which never points outside of template root
	pub fn path(&self, name: &str) -> Result<PathBuf> {
		let relative = Path::new(name);
		let inside_root = relative
			.components()
			.all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
		if name.is_empty() || !inside_root {
			return Err(TemplateError::InvalidName(name.to_owned()));
		}
		Ok(self.root.join(relative))
	}

	fn read(&self, name: &str) -> Result<(PathBuf, Vec<u8>)> {
		let path = self.path(name)?;
		match fs::read(&path) {
			Ok(bytes) => Ok((path, bytes)),
			Err(e) if e.kind() == io::ErrorKind::NotFound => Err(TemplateError::NotFound(path)),
			Err(source) => Err(TemplateError::Io { path, source }),
		}
	}

	/// Read and decode template by name
	pub fn load(&self, name: &str) -> Result<(DecodedObject, GroupVersionKind)> {
		let (path, bytes) = self.read(name)?;
		log::trace!("Decoding template {}", path.display());
		decode(&bytes).map_err(|source| TemplateError::Decode { path, source })
	}

	/// Like [`Templates::load`], but fails if template contains object of another kind
	pub fn load_as<K>(&self, name: &str) -> Result<K>
	where
		K: TemplateObject + k8s_openapi::Resource,
	{
		let (object, found) = self.load(name)?;
		K::from_decoded(object).map_err(|_| TemplateError::Decode {
			path: self.root.join(name),
			source: DecodeError::KindMismatch {
				expected: GroupVersionKind::of::<K>(),
				found,
			},
		})
	}
}
