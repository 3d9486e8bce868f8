//! Stub agent scripts shared by unit tests.
//!
//! All scripts are written once, before any test can execute one, so no
//! script is ever open for writing while another thread forks.

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::PathBuf,
    sync::OnceLock,
};

use tempfile::TempDir;

const SCRIPTS: &[(&str, &str)] = &[
    (
        "chatty",
        "#!/bin/sh\necho \"$GREETING\"\necho progress >&2\nexit 0\n",
    ),
    ("print_env", "#!/bin/sh\nexport -p\n"),
    (
        "fail",
        "#!/bin/sh\necho 'acme: authorization failed' >&2\nexit 3\n",
    ),
    ("slow", "#!/bin/sh\nexec sleep 10\n"),
    (
        "stalled",
        "#!/bin/sh\necho 'order created'\necho 'waiting for dns propagation' >&2\nexec sleep 10\n",
    ),
    (
        "write_artifacts",
        "#!/bin/sh\nset -e\n\
         [ -s \"$ACCOUNT_KEY_FILE\" ] || printf '%s\\n' 'GENERATED ACCOUNT KEY' > \"$ACCOUNT_KEY_FILE\"\n\
         printf '%s\\n' 'CERT' > \"$OUTPUT_DIRECTORY/$FILENAME.crt\"\n\
         printf '%s\\n' 'KEY' > \"$OUTPUT_DIRECTORY/$FILENAME.key\"\n\
         printf '%s\\n' 'ISSUER' > \"$OUTPUT_DIRECTORY/$FILENAME.issuer.crt\"\n",
    ),
];

fn scripts_dir() -> &'static TempDir {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = TempDir::new().expect("create script dir");
        for (name, body) in SCRIPTS {
            let path = dir.path().join(name);
            fs::write(&path, body).expect("write stub script");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("chmod stub script");
        }
        dir
    })
}

/// Path of a stub script by name.
pub fn script(name: &str) -> PathBuf {
    let path = scripts_dir().path().join(name);
    assert!(path.exists(), "unknown stub script {name}");
    path
}
