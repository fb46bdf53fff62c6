use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use shared::primitives::NormalizedEmail;

const SESSION_FILE: &str = "session.json";

/// The last successful login. The token is a bearer credential; the
/// password is never written.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub server: String,
    pub email: String,
    pub token: String,
}

pub fn data_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(home.join(".clipmark"))
}

pub fn save_session(session: &Session) -> Result<()> {
    save_session_in(&data_dir()?, session)
}

pub fn load_session() -> Result<Session> {
    load_session_in(&data_dir()?)
}

pub fn save_session_in(dir: &Path, session: &Session) -> Result<()> {
    fs::create_dir_all(dir)
        .map_err(|why| anyhow!("couldn't create {}: {}", dir.display(), why))?;

    let session = Session {
        email: NormalizedEmail::new(&session.email).0,
        ..session.clone()
    };
    let json = serde_json::to_string_pretty(&session)?;

    let path = dir.join(SESSION_FILE);
    let mut file = match create_private(&path) {
        Err(why) => return Err(anyhow!("couldn't create {}: {}", path.display(), why)),
        Ok(file) => file,
    };

    match file.write_all(json.as_bytes()) {
        Err(why) => Err(anyhow!("couldn't write to {}: {}", path.display(), why)),
        Ok(_) => Ok(()),
    }
}

/// Truncates or creates `path` readable by the owner only.
fn create_private(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    std::os::unix::fs::OpenOptionsExt::mode(&mut options, 0o600);

    let file = options.open(path)?;
    // `mode` only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }
    Ok(file)
}

pub fn load_session_in(dir: &Path) -> Result<Session> {
    let path = dir.join(SESSION_FILE);

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            return Err(anyhow!(
                "no saved session at {} ({}); run `login` first",
                path.display(),
                err
            ))
        }
    };

    Ok(serde_json::from_reader(&file)?)
}
