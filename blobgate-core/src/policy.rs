// Copyright 2026 Blobgate Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Upload policy gate.
//!
//! Checks presence, size and extension of an upload candidate. No I/O.

use crate::error::UploadRejection;
use crate::types::UploadCandidate;

/// Default upload size ceiling (100 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Extensions accepted for upload.
pub const PERMITTED_EXTENSIONS: [&str; 6] = [".txt", ".csv", ".xls", ".xlsx", ".json", ".xml"];

/// Returns the extension of `file_name`, including the leading dot.
///
/// Only the final path component is considered, and a trailing dot yields an
/// empty extension. Case is preserved.
pub fn extension_of(file_name: &str) -> &str {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match base.rfind('.') {
        Some(idx) if idx + 1 < base.len() => &base[idx..],
        _ => "",
    }
}

/// Immutable upload rules shared by every request.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    max_file_size: u64,
    permitted_extensions: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl UploadPolicy {
    /// Creates a policy with the given ceiling and the standard allow-list.
    pub fn new(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            permitted_extensions: PERMITTED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Size ceiling in bytes.
    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Allow-list, lower-case with leading dots.
    pub fn permitted_extensions(&self) -> &[String] {
        &self.permitted_extensions
    }

    /// Validates a candidate. Rules short-circuit in order: presence, size, extension.
    pub fn validate(&self, candidate: Option<&UploadCandidate>) -> Result<(), UploadRejection> {
        let candidate = match candidate {
            Some(c) if c.size_bytes > 0 => c,
            _ => return Err(UploadRejection::EmptyOrMissingFile),
        };

        if candidate.size_bytes > self.max_file_size {
            return Err(UploadRejection::FileTooLarge {
                size: candidate.size_bytes,
                limit: self.max_file_size,
            });
        }

        let extension = extension_of(&candidate.file_name).to_lowercase();
        if extension.is_empty() || !self.permitted_extensions.contains(&extension) {
            return Err(UploadRejection::ExtensionNotPermitted {
                extension,
                permitted: self.permitted_extensions.clone(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, size: u64) -> UploadCandidate {
        let mut c = UploadCandidate::new(name, vec![b'x'; size.min(16) as usize]);
        c.size_bytes = size;
        c
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("report.csv"), ".csv");
        assert_eq!(extension_of("archive.tar.XLSX"), ".XLSX");
        assert_eq!(extension_of("noext"), "");
        assert_eq!(extension_of("trailing."), "");
        assert_eq!(extension_of(".json"), ".json");
        assert_eq!(extension_of("dir.v2/readme"), "");
        assert_eq!(extension_of("C:\\Users\\me\\data.xml"), ".xml");
    }

    #[test]
    fn test_missing_or_empty_file() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.validate(None), Err(UploadRejection::EmptyOrMissingFile));
        // Empty content wins over a bad extension.
        assert_eq!(
            policy.validate(Some(&candidate("virus.exe", 0))),
            Err(UploadRejection::EmptyOrMissingFile)
        );
    }

    #[test]
    fn test_file_too_large() {
        let policy = UploadPolicy::default();
        let size = DEFAULT_MAX_FILE_SIZE + 1;
        assert_eq!(
            policy.validate(Some(&candidate("big.txt", size))),
            Err(UploadRejection::FileTooLarge {
                size,
                limit: DEFAULT_MAX_FILE_SIZE
            })
        );
        assert!(policy.validate(Some(&candidate("edge.txt", DEFAULT_MAX_FILE_SIZE))).is_ok());
    }

    #[test]
    fn test_permitted_extensions_case_insensitive() {
        let policy = UploadPolicy::default();
        for name in ["a.txt", "b.CSV", "c.xls", "d.Xlsx", "e.json", "f.XML"] {
            assert!(policy.validate(Some(&candidate(name, 10))).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_extension_not_permitted() {
        let policy = UploadPolicy::default();
        let err = policy.validate(Some(&candidate("setup.EXE", 10))).unwrap_err();
        match &err {
            UploadRejection::ExtensionNotPermitted {
                extension,
                permitted,
            } => {
                assert_eq!(extension, ".exe");
                assert_eq!(permitted.len(), PERMITTED_EXTENSIONS.len());
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
        assert!(err.to_string().contains(".exe"));
        assert!(err.to_string().contains(".xlsx"));

        let err = policy.validate(Some(&candidate("README", 10))).unwrap_err();
        assert!(matches!(err, UploadRejection::ExtensionNotPermitted { ref extension, .. } if extension.is_empty()));
    }

    #[test]
    fn test_custom_ceiling() {
        let policy = UploadPolicy::new(5);
        assert_eq!(policy.max_file_size(), 5);
        assert!(matches!(
            policy.validate(Some(&candidate("a.txt", 6))),
            Err(UploadRejection::FileTooLarge { size: 6, limit: 5 })
        ));
    }
}
