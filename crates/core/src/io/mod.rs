//! Access to files, remote POMs and repository metadata

mod file_io;
mod metadata;
mod model_io;

pub use file_io::FileIo;
pub use metadata::{MetadataReader, RepositoryMetadataReader};
pub use model_io::{ModelIo, ModelResolver, RepositoryModelResolver};

use crate::types::ProjectRef;

/// Repository layout path of an artifact directory: `org/example/app`
pub(crate) fn artifact_dir(project: &ProjectRef) -> String {
    format!(
        "{}/{}",
        project.group_id.replace('.', "/"),
        project.artifact_id
    )
}
