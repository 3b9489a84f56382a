//! Remote path resolution, directory iteration, and glob matching.

use nfs3_types::nfs3::{
    LOOKUP3args, Nfs3Result, READDIR3args, cookieverf3, diropargs3, fileid3, filename3, ftype3,
};

use crate::errors::ShellError;
use crate::session::{DirEntry, Handle, Session};

/// Walk a (possibly absolute) remote path component by component, starting
/// from the session's current directory (or root, for a leading `/`).
///
/// Returns the handle the final component resolves to. An empty path or a
/// bare `.` resolves to the starting directory itself.
pub async fn resolve(session: &mut Session, path: &str) -> Result<Handle, ShellError> {
    let (mut current, rest) = if let Some(rest) = path.strip_prefix('/') {
        (
            session
                .root_handle()
                .ok_or(ShellError::NotReady("not mounted"))?
                .clone(),
            rest,
        )
    } else {
        (
            session
                .cwd_handle()
                .ok_or(ShellError::NotReady("not mounted"))?
                .clone(),
            path,
        )
    };

    for component in rest.split('/').filter(|c| !c.is_empty()) {
        if component == "." {
            continue;
        }
        current = lookup_one(session, &current, component).await?;
    }
    Ok(current)
}

/// Resolve `path` and report whether it's a directory, erroring out the way
/// `cd` does when the target isn't one.
pub async fn resolve_dir(session: &mut Session, path: &str) -> Result<Handle, ShellError> {
    let handle = resolve(session, path).await?;
    let attr = getattr(session, &handle).await?;
    if attr.type_ != ftype3::NF3DIR {
        return Err(ShellError::Usage(format!("{path}: not a directory")));
    }
    Ok(handle)
}

/// Resolve a single child of an already-known directory handle, without
/// walking a path string. Useful once a directory has been listed and each
/// entry needs its own handle (e.g. for a long-format `ls`).
pub async fn lookup_child(session: &mut Session, dir: &Handle, name: &str) -> Result<Handle, ShellError> {
    lookup_one(session, dir, name).await
}

async fn lookup_one(session: &mut Session, dir: &Handle, name: &str) -> Result<Handle, ShellError> {
    let nfs = session.nfs_mut()?;
    let args = LOOKUP3args {
        what: diropargs3 {
            dir: dir.to_nfs_fh3(),
            name: filename3::from(name.as_bytes()),
        },
    };
    let res = nfs.lookup(args).await?;
    match res {
        Nfs3Result::Ok(ok) => Ok(Handle::from_nfs_fh3(&ok.object)),
        Nfs3Result::Err((stat, _)) => Err(stat_to_usage(name, stat)),
    }
}

pub async fn getattr(
    session: &mut Session,
    handle: &Handle,
) -> Result<nfs3_types::nfs3::fattr3, ShellError> {
    let nfs = session.nfs_mut()?;
    let res = nfs
        .getattr(nfs3_types::nfs3::GETATTR3args {
            object: handle.to_nfs_fh3(),
        })
        .await?;
    match res {
        Nfs3Result::Ok(ok) => Ok(ok.obj_attributes),
        Nfs3Result::Err((stat, ())) => Err(stat_to_usage("getattr", stat)),
    }
}

fn stat_to_usage(what: &str, stat: nfs3_types::nfs3::nfsstat3) -> ShellError {
    ShellError::Usage(format!(
        "{what}: {}",
        crate::errors::describe_nfsstat3(stat)
    ))
}

/// Fetch every entry of a directory, issuing as many `READDIR` calls as the
/// server's cookie-based pagination requires.
pub async fn read_dir(session: &mut Session, dir: &Handle) -> Result<Vec<DirEntry>, ShellError> {
    let mut entries = Vec::new();
    let mut cookie = 0u64;
    let mut cookieverf = cookieverf3::default();

    loop {
        let nfs = session.nfs_mut()?;
        let res = nfs
            .readdir(READDIR3args {
                dir: dir.to_nfs_fh3(),
                cookie,
                cookieverf,
                count: 8192,
            })
            .await?;

        let ok = match res {
            Nfs3Result::Ok(ok) => ok,
            Nfs3Result::Err((stat, _)) => return Err(stat_to_usage("readdir", stat)),
        };

        let mut last_cookie = cookie;
        let mut last_id: fileid3 = 0;
        for entry in ok.reply.entries.0 {
            last_cookie = entry.cookie;
            last_id = entry.fileid;
            let name = String::from_utf8_lossy(entry.name.as_ref()).into_owned();
            if name == "." || name == ".." {
                continue;
            }
            entries.push(DirEntry {
                name,
                fileid: entry.fileid,
            });
        }

        if ok.reply.eof {
            break;
        }
        cookie = last_cookie;
        cookieverf = ok.cookieverf;
        if last_id == 0 && entries.is_empty() {
            break;
        }
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}

/// Shell-style glob match (`*`, `?`, `[...]`), mirroring the subset the
/// original client's pattern matcher supported.
pub fn glob_match(name: &str, pattern: &str) -> bool {
    fn match_here(name: &[u8], pattern: &[u8], at_leading_dot: bool) -> bool {
        match pattern.first() {
            None => name.is_empty(),
            Some(b'*') if at_leading_dot => false,
            Some(b'*') => {
                match_here(name, &pattern[1..], false)
                    || (!name.is_empty() && match_here(&name[1..], pattern, false))
            }
            Some(b'?') if at_leading_dot => false,
            Some(b'?') => !name.is_empty() && match_here(&name[1..], &pattern[1..], false),
            Some(b'[') if at_leading_dot => false,
            Some(b'[') => {
                let Some(close) = pattern.iter().position(|&b| b == b']') else {
                    return !name.is_empty()
                        && name[0] == b'['
                        && match_here(&name[1..], &pattern[1..], false);
                };
                if name.is_empty() {
                    return false;
                }
                let class = &pattern[1..close];
                let (negate, class) = match class.first() {
                    Some(b'!' | b'^') => (true, &class[1..]),
                    _ => (false, class),
                };
                let hit = class_matches(class, name[0]);
                if hit == negate {
                    return false;
                }
                match_here(&name[1..], &pattern[close + 1..], false)
            }
            Some(&c) => {
                !name.is_empty() && name[0] == c && match_here(&name[1..], &pattern[1..], false)
            }
        }
    }

    fn class_matches(class: &[u8], c: u8) -> bool {
        let mut i = 0;
        while i < class.len() {
            if i + 2 < class.len() && class[i + 1] == b'-' {
                if class[i] <= c && c <= class[i + 2] {
                    return true;
                }
                i += 3;
            } else {
                if class[i] == c {
                    return true;
                }
                i += 1;
            }
        }
        false
    }

    let name = name.as_bytes();
    match_here(name, pattern.as_bytes(), name.first() == Some(&b'.'))
}

#[cfg(test)]
mod tests {
    use super::glob_match;

    #[test]
    fn star_matches_everything() {
        assert!(glob_match("anything.txt", "*"));
        assert!(glob_match("", "*"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        assert!(glob_match("cat", "c?t"));
        assert!(!glob_match("ct", "c?t"));
    }

    #[test]
    fn bracket_class_matches_range() {
        assert!(glob_match("file1.txt", "file[0-9].txt"));
        assert!(!glob_match("fileA.txt", "file[0-9].txt"));
    }

    #[test]
    fn negated_class() {
        assert!(glob_match("fileA.txt", "file[!0-9].txt"));
        assert!(!glob_match("file5.txt", "file[!0-9].txt"));
    }

    #[test]
    fn literal_without_wildcards_requires_exact_match() {
        assert!(glob_match("readme.md", "readme.md"));
        assert!(!glob_match("readme.md", "readme.txt"));
    }

    #[test]
    fn star_does_not_match_leading_dot() {
        assert!(!glob_match(".bashrc", "*"));
        assert!(glob_match(".bashrc", ".*"));
        assert!(!glob_match(".bashrc", "?bashrc"));
        assert!(!glob_match(".bashrc", "[.]bashrc"));
    }
}
