//! Shared test infrastructure for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const SOURCE_NAME: &str = "Dark-Telegram.user.styl";
pub const SIBLING_NAME: &str = "Dark-Telegram.user.css";

/// Minimal UserStyle source in the dialect the tool understands.
pub const SOURCE: &str = "\
/* ==UserStyle==
@name           Dark Telegram
@namespace      github.com/Barina/dark-telegram
@version        2.3
@preprocessor   stylus

@var color accent 'Accent color' #5288c1
@var range opacity 'Panel opacity' [90, 0, 100, 1, '%']
@var select bubbles 'Bubble style' {
    * Rounded: rounded,
    * Square: square,
}
==/UserStyle== */

:root {
    --accent accent
    --bg: #17212b;
    --version \"\"
}

@-moz-document domain(\"web.telegram.org\") {
    /* chat panels */
    .panel {
        color: var(--accent);
        background: var(--bg);
    }
}
";

/// Temporary working directory seeded with a UserStyle source.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join(SOURCE_NAME), SOURCE).expect("write source");
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap_or_else(|err| panic!("read {name}: {err}"))
    }

    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.path(name), contents).unwrap_or_else(|err| panic!("write {name}: {err}"));
    }

    /// Run `uscomp` with the workspace as its working directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_uscomp"))
            .args(args)
            .current_dir(self.dir.path())
            .env("RUST_LOG", "off")
            .output()
            .expect("run uscomp")
    }

    /// Install a stand-in compiler that copies `<x>.styl` to `<x>.css` and
    /// prints the success transcript.
    #[cfg(unix)]
    pub fn install_fake_compiler(&self, success: bool) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let script = self.path("fake-stylus");
        let body = if success {
            "#!/bin/sh\nfor last in \"$@\"; do :; done\ncp \"$last\" \"${last%.styl}.css\"\necho \"  compiled ${last%.styl}.css\"\n"
        } else {
            "#!/bin/sh\necho \"ParseError: unexpected token\" >&2\nexit 1\n"
        };
        fs::write(&script, body).expect("write fake compiler");
        let mut perms = fs::metadata(&script).expect("stat script").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&script, perms).expect("chmod script");
        script
    }
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}
