//! Shared fixtures: a fake `gpg` whose keyring is a directory of files
//! named after key ids, and helpers to read what it was asked to do.

#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;

pub const KEY_ID: &str = "3804BB82D39DC0E3";

/// Emulates the gpg command-line surface used by gpg-reconcile.
///
/// - keyservers whose URL contains `bad` always fail
/// - refresh always reports the key as unchanged
/// - key files carry their id as a `KEYID=<hex>` line
/// - `--dry-run` never touches the keyring
const FAKE_GPG: &str = r#"#!/bin/sh
ring="$FAKE_GPG_RING"
echo "$*" >> "$ring/../calls.log"
dry=0; server=""; op=""; target=""
while [ $# -gt 0 ]; do
  case "$1" in
    --dry-run) dry=1 ;;
    --keyserver) shift; server="$1" ;;
    --keyserver-options) shift ;;
    --list-keys|--list-public-keys|--list-secret-keys|--delete-keys|--delete-secret-and-public-keys|--refresh-keys|--recv-keys|--import)
      op="$1"; shift; target="$1" ;;
  esac
  shift
done
case "$op" in
  --list-keys|--list-public-keys|--list-secret-keys)
    if [ -f "$ring/$target" ]; then echo "pub   rsa4096 $target"; exit 0; fi
    echo "gpg: error reading key: No public key" >&2; exit 2 ;;
  --delete-keys|--delete-secret-and-public-keys)
    if [ ! -f "$ring/$target" ]; then echo "gpg: key \"$target\" not found" >&2; exit 2; fi
    [ "$dry" -eq 1 ] || rm "$ring/$target"
    exit 0 ;;
  --recv-keys|--refresh-keys)
    case "$server" in
      *bad*) echo "gpg: keyserver receive failed: Connection refused" >&2; exit 2 ;;
    esac
    if [ "$op" = "--refresh-keys" ]; then
      echo "gpg: Total number processed: 1" >&2
      echo "gpg:              unchanged: 1" >&2
      exit 0
    fi
    [ "$dry" -eq 1 ] || touch "$ring/$target"
    echo "gpg: key $target: public key \"Test <test@example.org>\" imported" >&2
    exit 0 ;;
  --import)
    id=$(sed -n 's/^KEYID=\([0-9A-F]*\)$/\1/p' "$target" | head -n 1)
    if [ -z "$id" ]; then echo "gpg: no valid OpenPGP data found." >&2; exit 2; fi
    echo "gpg: key $id: public key \"Test <test@example.org>\" imported" >&2
    [ "$dry" -eq 1 ] || touch "$ring/$id"
    exit 0 ;;
esac
echo "gpg: unsupported invocation" >&2
exit 2
"#;

/// A temp dir holding the fake gpg binary and its keyring.
pub struct FakeGpg {
    pub dir: assert_fs::TempDir,
}

impl FakeGpg {
    pub fn new() -> Self {
        let dir = assert_fs::TempDir::new().unwrap();
        dir.child("ring").create_dir_all().unwrap();
        let bin = dir.child("gpg");
        bin.write_str(FAKE_GPG).unwrap();
        std::fs::set_permissions(bin.path(), std::fs::Permissions::from_mode(0o755)).unwrap();
        Self { dir }
    }

    pub fn binary(&self) -> PathBuf {
        self.dir.path().join("gpg")
    }

    pub fn ring(&self) -> PathBuf {
        self.dir.path().join("ring")
    }

    /// Put a key into the fake keyring.
    pub fn add_key(&self, id: &str) {
        std::fs::write(self.ring().join(id), "").unwrap();
    }

    pub fn has_key(&self, id: &str) -> bool {
        self.ring().join(id).exists()
    }

    /// Write a key file with the given body and return its path.
    pub fn key_file(&self, name: &str, body: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, body).unwrap();
        path
    }

    /// Every gpg invocation so far, one argument string per call.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|s| s.lines().map(String::from).collect())
            .unwrap_or_default()
    }

    /// `gpg-reconcile <subcommand>` wired to this fake gpg.
    pub fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = cargo_bin_cmd!("gpg-reconcile");
        cmd.env_remove("RUST_LOG")
            .env_remove("GPG_RECONCILE_CONFIG")
            .env_remove("GPG_RECONCILE_KEY_ID")
            .env_remove("GPG_RECONCILE_GPG")
            .env_remove("GPG_RECONCILE_TRACE_FILE")
            .env("FAKE_GPG_RING", self.ring())
            .arg(subcommand)
            .arg("--gpg")
            .arg(self.binary())
            .args(["--delay", "0"]);
        cmd
    }
}

/// `gpg-reconcile` with a clean environment and no gpg wiring.
pub fn reconcile() -> Command {
    let mut cmd = cargo_bin_cmd!("gpg-reconcile");
    cmd.env_remove("RUST_LOG")
        .env_remove("GPG_RECONCILE_CONFIG")
        .env_remove("GPG_RECONCILE_TRACE_FILE");
    cmd
}

/// Parse a command's stdout as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}
