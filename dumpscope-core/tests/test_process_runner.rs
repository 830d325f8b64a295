//! シェルスクリプトの cdb を実際に起動する WinDbg バックエンドのテスト
#![cfg(unix)]

use dumpscope_core::{Debugger, DumpTarget, WinDbg, WinDbgConfig};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

/// `-logo` のログに `.echo` と `.lastevent` の出力を書く cdb
const FAKE_CDB: &str = r#"#!/bin/sh
set -f
while [ $# -gt 0 ]; do
    case "$1" in
        -z) dump="$2"; shift 2 ;;
        -logo) log="$2"; shift 2 ;;
        -c) script="$2"; shift 2 ;;
        *) shift ;;
    esac
done
printf 'Loading Dump File [%s]\n0:000> %s\n' "$dump" "$script" > "$log"
IFS=';'
for cmd in $script; do
    case "$cmd" in
        ".echo "*) printf '%s\n' "${cmd#.echo }" >> "$log" ;;
        ".lastevent") printf 'Last event: 97cc.e00: Access violation - code c0000005\n' >> "$log" ;;
    esac
done
printf 'quit:\n' >> "$log"
"#;

fn install_fake_cdb(dir: &Path) -> std::path::PathBuf {
    let cdb = dir.join("cdb.exe");
    fs::write(&cdb, FAKE_CDB).unwrap();
    fs::set_permissions(&cdb, fs::Permissions::from_mode(0o755)).unwrap();
    cdb
}

#[test]
fn test_open_and_analyze_with_process_runner() {
    let dir = TempDir::new().unwrap();
    let config = WinDbgConfig {
        cdb_path: install_fake_cdb(dir.path()),
        downstream_symbols: dir.path().join("DownstreamSymbols"),
        command_timeout: Duration::from_secs(10),
        ..WinDbgConfig::default()
    };
    let target = DumpTarget::new(dir.path().join("TheCrasher.dmp"), "srv*c:\\symbols");

    let windbg = WinDbg::open(target, config).unwrap();
    let analysis = windbg.raw_analysis().unwrap();

    assert!(analysis.starts_with("== Start Calling !analyze -v =="));
    assert!(analysis.contains("== End Calling !analyze -v =="));
    assert!(analysis.contains("Last event: 97cc.e00: Access violation - code c0000005"));
    assert!(analysis.ends_with("== End Calling .lastevent =="));
    assert!(!analysis.contains("Loading Dump File"));
    assert!(!analysis.contains("quit:"));
}
