//! # Checkpoint — Resumable Search-State Persistence
//!
//! `ckpt.txt` holds exactly two whitespace-separated integers: the last
//! fully-processed `N` and the rolling subset-sum checksum. Absence means
//! start fresh from the range's own lower bound — [`crate::search::Driver`]
//! runs its fresh-start prolog in that case rather than consulting this
//! module.
//!
//! Every write lands exactly on a block boundary (`N` at residue 27 mod 30):
//! the driver always resumes a loaded checkpoint by restarting its step
//! cycle from the beginning, which is only correct there.
//!
//! Writes are atomic (write to a temp file, then rename over the target)
//! so a crash mid-write never leaves a truncated or partially-written
//! `ckpt.txt` behind. The format itself is the plain two-integer form: no
//! generational backups or checksum envelope — a single malformed
//! `ckpt.txt` is a fatal parse error, not a fall-back-to-previous-generation
//! case.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Checkpoint {
    pub n: u64,
    pub checksum: u64,
}

impl Checkpoint {
    /// Load `ckpt.txt` if present; `Ok(None)` means absent (start fresh),
    /// `Err` means present but unparseable.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading checkpoint {}", path.display()))?;
        let mut fields = text.split_whitespace();
        let n: u64 = fields
            .next()
            .context("ckpt.txt missing N")?
            .parse()
            .context("ckpt.txt N is not a valid integer")?;
        let checksum: u64 = fields
            .next()
            .context("ckpt.txt missing checksum")?
            .parse()
            .context("ckpt.txt checksum is not a valid integer")?;
        Ok(Some(Checkpoint { n, checksum }))
    }

    /// Atomically overwrite `ckpt.txt` with the current state.
    pub fn save(&self, path: &Path) -> Result<()> {
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, format!("{} {}", self.n, self.checksum))
            .with_context(|| format!("writing temp checkpoint {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("renaming checkpoint into place at {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_as_none() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ckpt.txt");
        assert!(Checkpoint::load(&path).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ckpt.txt");
        let c = Checkpoint { n: 1_234_567_890, checksum: 42 };
        c.save(&path).unwrap();
        let loaded = Checkpoint::load(&path).unwrap().unwrap();
        assert_eq!(loaded, c);
    }

    #[test]
    fn save_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ckpt.txt");
        Checkpoint { n: 1, checksum: 0 }.save(&path).unwrap();
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn corrupt_checkpoint_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ckpt.txt");
        fs::write(&path, "not-a-number").unwrap();
        assert!(Checkpoint::load(&path).is_err());
    }
}
