//! REPL command dispatch: one function per verb, fed by a tokenized line.

use std::path::PathBuf;

use nfs3_types::nfs3::{
    CREATE3args, LINK3args, MKDIR3args, READ3args, REMOVE3args, RENAME3args,
    RMDIR3args, SETATTR3args, WRITE3args, createhow3, createverf3, diropargs3, fattr3, filename3,
    ftype3, sattr3, sattrguard3, set_atime, set_gid3, set_mode3, set_mtime, set_size3, set_uid3,
    stable_how,
};
use nfs3_types::nfs3::{Nfs3Option, Nfs3Result};
use nfs3_types::xdr_codec::Opaque;
use nfs3_client::source_route::SourceRoute;

use tokio::io::AsyncWriteExt;

use crate::errors::{ShellError, describe_nfsstat3};
use crate::path::{glob_match, read_dir, resolve, resolve_dir};
use crate::session::{Handle, MountOptions, Session, Transport};

/// Parse one line of input into whitespace-separated words. No quoting
/// support, matching the original's simple tokenizer.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Run a single parsed command. Returns `Ok(false)` on `quit`/`bye`.
pub async fn dispatch(session: &mut Session, words: &[String]) -> Result<bool, ShellError> {
    let Some(cmd) = words.first() else {
        return Ok(true);
    };

    if let Some(shell_cmd) = cmd.strip_prefix('!') {
        run_shell(shell_cmd, &words[1..])?;
        return Ok(true);
    }

    let args = &words[1..];

    match cmd.as_str() {
        "quit" | "bye" => return Ok(false),
        "help" => print_help(),
        "host" => cmd_host(session, args)?,
        "uid" => cmd_uid(session, args),
        "gid" => cmd_gid(session, args),
        "cd" => cmd_cd(session, args).await?,
        "lcd" => cmd_lcd(args)?,
        "ls" => cmd_ls(session, args).await?,
        "cat" => cmd_cat(session, args).await?,
        "get" => cmd_get(session, args).await?,
        "put" => cmd_put(session, args).await?,
        "df" => cmd_df(session).await?,
        "rm" => cmd_rm(session, args).await?,
        "ln" => cmd_ln(session, args).await?,
        "mv" => cmd_mv(session, args).await?,
        "mkdir" => cmd_mkdir(session, args).await?,
        "rmdir" => cmd_rmdir(session, args).await?,
        "mknod" => cmd_mknod(session, args).await?,
        "chmod" => cmd_chmod(session, args).await?,
        "chown" => cmd_chown(session, args).await?,
        "handle" => cmd_handle(session, args).await?,
        "mount" => cmd_mount(session, args).await?,
        "umount" => cmd_umount(session),
        "umountall" => cmd_umountall(session).await?,
        "export" => cmd_export(session).await?,
        "dump" => cmd_dump(session).await?,
        "status" => cmd_status(session),
        other => println!("{other}: unknown command, try 'help'"),
    }
    Ok(true)
}

/// `!cmd args...`: run `cmd` in a local shell, the way the original client's
/// `!` escape did, instead of sending anything to the server.
fn run_shell(leading: &str, rest: &[String]) -> Result<(), ShellError> {
    let mut words: Vec<&str> = Vec::with_capacity(1 + rest.len());
    if !leading.is_empty() {
        words.push(leading);
    }
    words.extend(rest.iter().map(String::as_str));
    if words.is_empty() {
        return Ok(());
    }
    let command_line = words.join(" ");
    let status = std::process::Command::new("sh")
        .arg("-c")
        .arg(&command_line)
        .status()?;
    if !status.success() {
        if let Some(code) = status.code() {
            println!("exit status {code}");
        }
    }
    Ok(())
}

fn print_help() {
    const LINES: &[(&str, &str)] = &[
        ("host", "[<localaddr>]@[<host>:...]<dest> - set remote host, optionally source-routed"),
        ("uid", "[<uid>] - set remote user id"),
        ("gid", "[<gid>] - set remote group id"),
        ("cd", "[<path>] - change remote working directory"),
        ("lcd", "[<path>] - change local working directory"),
        ("cat", "<filespec> - display remote file"),
        ("ls", "[-l] <filespec> - list remote directory"),
        ("get", "[-i] <filespec> - get remote files"),
        ("df", "- file system information"),
        ("rm", "<file> - delete remote file"),
        ("ln", "<file1> <file2> - link file"),
        ("mv", "<file1> <file2> - move file"),
        ("mkdir", "<dir> - make remote directory"),
        ("rmdir", "<dir> - remove remote directory"),
        ("mknod", "<path> c|b|s|p [major minor] - make device node"),
        ("chmod", "<mode> <file> - change mode"),
        ("chown", "<uid>[.<gid>] <file> - change owner"),
        ("put", "<local-file> [<remote-file>] - put file"),
        ("mount", "[-u] [-p] [-T|-U] [-P port] <path> - mount file system"),
        ("umount", "- umount remote file system"),
        ("umountall", "- umount all remote file systems"),
        ("export", "- show all exported file systems"),
        ("dump", "- show all remote mounted file systems"),
        ("status", "- general status report"),
        ("help", "- this help message"),
        ("quit", "- its all in the name"),
        ("handle", "[-T|-U] [-P port] [<handle>] - get/set directory file handle"),
        ("!", "<command> - escape to local shell"),
    ];
    for (name, help) in LINES {
        println!("{name:<10} {help}");
    }
}

fn cmd_host(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let arg = args
        .first()
        .ok_or_else(|| ShellError::Usage("usage: host <host>".to_string()))?;
    let (host, source_route) = parse_host_arg(arg)?;
    session.set_host_with_route(host, source_route);
    Ok(())
}

/// Parse `host`'s `[<localaddr>]@[<host>:...]<dest>` source-route syntax.
/// A plain host name with no `@` skips source routing entirely.
fn parse_host_arg(
    arg: &str,
) -> Result<(String, Option<(Option<String>, SourceRoute)>), ShellError> {
    match arg.split_once('@') {
        None => Ok((arg.to_string(), None)),
        Some((local, route_part)) => {
            let local_addr = if local.is_empty() {
                None
            } else {
                Some(local.to_string())
            };
            let csv = route_part.replace(':', ",");
            let route = SourceRoute::parse(&csv)
                .map_err(|e| ShellError::Usage(format!("host: {e}")))?;
            let dest = route_part
                .rsplit(':')
                .next()
                .unwrap_or(route_part)
                .to_string();
            Ok((dest, Some((local_addr, route))))
        }
    }
}

fn cmd_uid(session: &mut Session, args: &[String]) {
    match args.first().and_then(|s| s.parse::<u32>().ok()) {
        Some(uid) => session.identity_mut().uid = uid,
        None => println!("uid={}", session.identity().uid),
    }
}

fn cmd_gid(session: &mut Session, args: &[String]) {
    match args.first().and_then(|s| s.parse::<u32>().ok()) {
        Some(gid) => session.identity_mut().gid = gid,
        None => println!("gid={}", session.identity().gid),
    }
}

async fn cmd_cd(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let target = args.first().map_or("/", String::as_str);
    let handle = resolve_dir(session, target).await?;
    let new_path = normalize(session.cwd_path(), target);
    session.set_cwd(handle, new_path);
    Ok(())
}

fn cmd_lcd(args: &[String]) -> Result<(), ShellError> {
    let target = match args.first() {
        Some(p) => PathBuf::from(p),
        None => std::env::var("HOME").map(PathBuf::from).unwrap_or_default(),
    };
    std::env::set_current_dir(&target)?;
    Ok(())
}

fn normalize(cwd: &str, target: &str) -> String {
    if let Some(rest) = target.strip_prefix('/') {
        return format!("/{rest}").replace("//", "/");
    }
    let mut parts: Vec<&str> = cwd.split('/').filter(|s| !s.is_empty()).collect();
    for component in target.split('/').filter(|s| !s.is_empty()) {
        match component {
            "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    format!("/{}", parts.join("/"))
}

async fn cmd_ls(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let (long, patterns): (bool, &[String]) = match args.first().map(String::as_str) {
        Some("-l") => (true, &args[1..]),
        _ => (false, args),
    };

    let dir = session
        .cwd_handle()
        .ok_or(ShellError::NotReady("not mounted"))?
        .clone();

    let entries = read_dir(session, &dir).await?;
    let filtered: Vec<_> = if patterns.is_empty() {
        entries
            .into_iter()
            .filter(|e| glob_match(&e.name, "*"))
            .collect()
    } else {
        entries
            .into_iter()
            .filter(|e| patterns.iter().any(|p| glob_match(&e.name, p)))
            .collect()
    };

    for entry in filtered {
        if long {
            match crate::path::lookup_child(session, &dir, &entry.name).await {
                Ok(h) => match crate::path::getattr(session, &h).await {
                    Ok(attr) => println!("{}", format_long(&entry.name, &attr)),
                    Err(_) => println!("{}", entry.name),
                },
                Err(_) => println!("{}", entry.name),
            }
        } else {
            println!("{}", entry.name);
        }
    }
    Ok(())
}

fn format_long(name: &str, attr: &fattr3) -> String {
    let kind = match attr.type_ {
        ftype3::NF3DIR => 'd',
        ftype3::NF3LNK => 'l',
        ftype3::NF3BLK => 'b',
        ftype3::NF3CHR => 'c',
        ftype3::NF3SOCK => 's',
        ftype3::NF3FIFO => 'p',
        ftype3::NF3REG => '-',
    };
    format!(
        "{kind}{} {:>4} {:>8} {:>8} {:>10} {name}",
        format_perm_bits(attr.mode),
        attr.nlink,
        attr.uid,
        attr.gid,
        attr.size
    )
}

/// Render the low 9 mode bits as `rwxrwxrwx`, with `s`/`t` where the
/// setuid/setgid/sticky bits are set, the way `ls -l` does.
fn format_perm_bits(mode: u32) -> String {
    const TRIADS: [(u32, u32, char); 3] = [
        (0o400, 0o4000, 's'),
        (0o040, 0o2000, 's'),
        (0o004, 0o1000, 't'),
    ];
    let mut out = String::with_capacity(9);
    for (shift, special_bit, special_char) in TRIADS {
        let r = if mode & shift != 0 { 'r' } else { '-' };
        let w = if mode & (shift >> 1) != 0 { 'w' } else { '-' };
        let x_set = mode & (shift >> 2) != 0;
        let special = mode & special_bit != 0;
        let x = match (x_set, special) {
            (true, true) => special_char,
            (false, true) => special_char.to_ascii_uppercase(),
            (true, false) => 'x',
            (false, false) => '-',
        };
        out.push(r);
        out.push(w);
        out.push(x);
    }
    out
}

async fn cmd_cat(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let path = args
        .first()
        .ok_or_else(|| ShellError::Usage("usage: cat <filespec>".to_string()))?;
    let handle = resolve(session, path).await?;
    let data = read_whole_file(session, &handle).await?;
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    use std::io::Write as _;
    lock.write_all(&data)?;
    Ok(())
}

/// `get [-i] [glob ...]`: download every regular file directly under the
/// current directory matching any of the glob patterns (`*` if none are
/// given) to a same-named local file, asking `name? ` before each one
/// unless `-i` was passed.
async fn cmd_get(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let (no_prompt, patterns): (bool, &[String]) = match args.first().map(String::as_str) {
        Some("-i") => (true, &args[1..]),
        _ => (false, args),
    };

    let dir = session
        .cwd_handle()
        .ok_or(ShellError::NotReady("not mounted"))?
        .clone();
    let entries = read_dir(session, &dir).await?;
    let matches = |name: &str| {
        if patterns.is_empty() {
            glob_match(name, "*")
        } else {
            patterns.iter().any(|p| glob_match(name, p))
        }
    };

    for entry in entries.into_iter().filter(|e| matches(&e.name)) {
        let handle = match crate::path::lookup_child(session, &dir, &entry.name).await {
            Ok(h) => h,
            Err(_) => continue,
        };
        let attr = match crate::path::getattr(session, &handle).await {
            Ok(attr) => attr,
            Err(_) => continue,
        };
        if attr.type_ != ftype3::NF3REG {
            continue;
        }

        if no_prompt {
            println!("{}? Yes", entry.name);
        } else if !confirm(&format!("{}? ", entry.name))? {
            continue;
        }

        let data = read_whole_file(session, &handle).await?;
        let mut file = tokio::fs::File::create(&entry.name).await?;
        file.write_all(&data).await?;
    }
    Ok(())
}

/// Print `prompt` and read a line from stdin, treating anything starting
/// with `y`/`Y` as yes.
fn confirm(prompt: &str) -> Result<bool, ShellError> {
    use std::io::Write as _;
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim_start().starts_with(['y', 'Y']))
}

async fn read_whole_file(session: &mut Session, handle: &Handle) -> Result<Vec<u8>, ShellError> {
    let chunk = session.rtmax();
    let mut data = Vec::new();
    let mut offset = 0u64;
    loop {
        let nfs = session.nfs_mut()?;
        let res = nfs
            .read(READ3args {
                file: handle.to_nfs_fh3(),
                offset,
                count: chunk,
            })
            .await?;
        let ok = match res {
            Nfs3Result::Ok(ok) => ok,
            Nfs3Result::Err((stat, _)) => {
                return Err(ShellError::Usage(describe_nfsstat3(stat).to_string()));
            }
        };
        data.extend_from_slice(ok.data.as_ref());
        offset += u64::from(ok.count);
        if ok.eof || ok.count == 0 {
            break;
        }
    }
    Ok(data)
}

async fn cmd_put(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let local = args
        .first()
        .ok_or_else(|| ShellError::Usage("usage: put <local-file> [remote-file]".to_string()))?;
    let remote_name = args.get(1).cloned().unwrap_or_else(|| {
        local
            .rsplit('/')
            .next()
            .unwrap_or(local.as_str())
            .to_string()
    });

    let data = tokio::fs::read(local).await?;
    let (dir_path, file_name) = split_parent(&remote_name);
    let dir_handle = resolve_dir(session, &dir_path).await?;

    let verifier = createverf3(rand::random());
    let nfs = session.nfs_mut()?;
    let create_res = nfs
        .create(CREATE3args {
            where_: diropargs3 {
                dir: dir_handle.to_nfs_fh3(),
                name: filename3::from(file_name.as_bytes()),
            },
            how: createhow3::EXCLUSIVE(verifier),
        })
        .await?;
    let file_handle = match create_res {
        Nfs3Result::Ok(ok) => match ok.obj {
            Nfs3Option::Some(fh) => Handle::from_nfs_fh3(&fh),
            Nfs3Option::None => resolve(session, &remote_name).await?,
        },
        Nfs3Result::Err((stat, _)) => {
            return Err(ShellError::Usage(describe_nfsstat3(stat).to_string()));
        }
    };

    // EXCLUSIVE create ignores sattr3 and sets the verifier as the mtime;
    // a follow-up SETATTR is how RFC1813 says to apply real attributes.
    let nfs = session.nfs_mut()?;
    let setattr_res = nfs
        .setattr(SETATTR3args {
            object: file_handle.to_nfs_fh3(),
            new_attributes: default_sattr3(),
            guard: sattrguard3::None,
        })
        .await?;
    if let Nfs3Result::Err((stat, _)) = setattr_res {
        return Err(ShellError::Usage(describe_nfsstat3(stat).to_string()));
    }

    let chunk_size = session.wtmax() as usize;
    let mut offset = 0u64;
    for chunk in data.chunks(chunk_size) {
        let nfs = session.nfs_mut()?;
        let res = nfs
            .write(WRITE3args {
                file: file_handle.to_nfs_fh3(),
                offset,
                count: u32::try_from(chunk.len()).unwrap_or(u32::MAX),
                stable: stable_how::UNSTABLE,
                data: Opaque::borrowed(chunk),
            })
            .await?;
        match res {
            Nfs3Result::Ok(_) => {}
            Nfs3Result::Err((stat, _)) => {
                return Err(ShellError::Usage(describe_nfsstat3(stat).to_string()));
            }
        }
        offset += chunk.len() as u64;
    }
    Ok(())
}

fn split_parent(path: &str) -> (String, String) {
    match path.rsplit_once('/') {
        Some((dir, name)) if !dir.is_empty() => (dir.to_string(), name.to_string()),
        Some((_, name)) => ("/".to_string(), name.to_string()),
        None => (".".to_string(), path.to_string()),
    }
}

fn default_sattr3() -> sattr3 {
    sattr3 {
        mode: Nfs3Option::Some(0o644),
        uid: Nfs3Option::None,
        gid: Nfs3Option::None,
        size: Nfs3Option::None,
        atime: set_atime::DONT_CHANGE,
        mtime: set_mtime::DONT_CHANGE,
    }
}

async fn cmd_df(session: &mut Session) -> Result<(), ShellError> {
    let root = session
        .root_handle()
        .ok_or(ShellError::NotReady("not mounted"))?
        .clone();
    let nfs = session.nfs_mut()?;
    let res = nfs
        .fsstat(nfs3_types::nfs3::FSSTAT3args {
            fsroot: root.to_nfs_fh3(),
        })
        .await?;
    match res {
        Nfs3Result::Ok(ok) => {
            println!(
                "total {} used {} free {} files {} ({} free)",
                ok.tbytes, ok.tbytes - ok.fbytes, ok.fbytes, ok.tfiles, ok.ffiles
            );
            Ok(())
        }
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_rm(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let path = args
        .first()
        .ok_or_else(|| ShellError::Usage("usage: rm <file>".to_string()))?;
    let (dir_path, name) = split_parent(path);
    let dir = resolve_dir(session, &dir_path).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .remove(REMOVE3args {
            object: diropargs3 {
                dir: dir.to_nfs_fh3(),
                name: filename3::from(name.as_bytes()),
            },
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_ln(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    if args.len() != 2 {
        return Err(ShellError::Usage("usage: ln <file1> <file2>".to_string()));
    }
    let target = resolve(session, &args[0]).await?;
    let (dir_path, name) = split_parent(&args[1]);
    let dir = resolve_dir(session, &dir_path).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .link(LINK3args {
            file: target.to_nfs_fh3(),
            link: diropargs3 {
                dir: dir.to_nfs_fh3(),
                name: filename3::from(name.as_bytes()),
            },
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_mv(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    if args.len() != 2 {
        return Err(ShellError::Usage("usage: mv <file1> <file2>".to_string()));
    }
    let (from_dir_path, from_name) = split_parent(&args[0]);
    let (to_dir_path, to_name) = split_parent(&args[1]);
    let from_dir = resolve_dir(session, &from_dir_path).await?;
    let to_dir = resolve_dir(session, &to_dir_path).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .rename(RENAME3args {
            from: diropargs3 {
                dir: from_dir.to_nfs_fh3(),
                name: filename3::from(from_name.as_bytes()),
            },
            to: diropargs3 {
                dir: to_dir.to_nfs_fh3(),
                name: filename3::from(to_name.as_bytes()),
            },
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_mkdir(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let path = args
        .first()
        .ok_or_else(|| ShellError::Usage("usage: mkdir <dir>".to_string()))?;
    let (dir_path, name) = split_parent(path);
    let dir = resolve_dir(session, &dir_path).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .mkdir(MKDIR3args {
            where_: diropargs3 {
                dir: dir.to_nfs_fh3(),
                name: filename3::from(name.as_bytes()),
            },
            attributes: default_sattr3(),
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_rmdir(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let path = args
        .first()
        .ok_or_else(|| ShellError::Usage("usage: rmdir <dir>".to_string()))?;
    let (dir_path, name) = split_parent(path);
    let dir = resolve_dir(session, &dir_path).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .rmdir(RMDIR3args {
            object: diropargs3 {
                dir: dir.to_nfs_fh3(),
                name: filename3::from(name.as_bytes()),
            },
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_mknod(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let usage = "usage: mknod <path> c|b|s|p [major minor]";
    if args.len() < 2 {
        return Err(ShellError::Usage(usage.to_string()));
    }
    let (dir_path, name) = split_parent(&args[0]);
    let dir = resolve_dir(session, &dir_path).await?;

    let what = match args[1].as_str() {
        "c" | "b" => {
            if args.len() < 4 {
                return Err(ShellError::Usage(usage.to_string()));
            }
            let specdata1 = args[2]
                .parse::<u32>()
                .map_err(|_| ShellError::Usage(format!("mknod: invalid major '{}'", args[2])))?;
            let specdata2 = args[3]
                .parse::<u32>()
                .map_err(|_| ShellError::Usage(format!("mknod: invalid minor '{}'", args[3])))?;
            let dev = nfs3_types::nfs3::devicedata3 {
                dev_attributes: default_sattr3(),
                spec: nfs3_types::nfs3::specdata3 {
                    specdata1,
                    specdata2,
                },
            };
            if args[1] == "c" {
                nfs3_types::nfs3::mknoddata3::NF3CHR(dev)
            } else {
                nfs3_types::nfs3::mknoddata3::NF3BLK(dev)
            }
        }
        "s" => nfs3_types::nfs3::mknoddata3::NF3SOCK(default_sattr3()),
        "p" => nfs3_types::nfs3::mknoddata3::NF3FIFO(default_sattr3()),
        other => return Err(ShellError::Usage(format!("mknod: unknown type '{other}'"))),
    };

    let nfs = session.nfs_mut()?;
    let res = nfs
        .mknod(nfs3_types::nfs3::MKNOD3args {
            where_: diropargs3 {
                dir: dir.to_nfs_fh3(),
                name: filename3::from(name.as_bytes()),
            },
            what,
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_chmod(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    if args.len() != 2 {
        return Err(ShellError::Usage("usage: chmod <mode> <file>".to_string()));
    }
    let mode = u32::from_str_radix(&args[0], 8)
        .map_err(|_| ShellError::Usage(format!("chmod: invalid mode '{}'", args[0])))?;
    let handle = resolve(session, &args[1]).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .setattr(SETATTR3args {
            object: handle.to_nfs_fh3(),
            new_attributes: sattr3 {
                mode: set_mode3::Some(mode),
                uid: set_uid3::None,
                gid: set_gid3::None,
                size: set_size3::None,
                atime: set_atime::DONT_CHANGE,
                mtime: set_mtime::DONT_CHANGE,
            },
            guard: sattrguard3::None,
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

async fn cmd_chown(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    if args.len() != 2 {
        return Err(ShellError::Usage(
            "usage: chown <uid>[.<gid>] <file>".to_string(),
        ));
    }
    let (uid_str, gid_str) = args[0].split_once('.').map_or((args[0].as_str(), None), |(u, g)| (u, Some(g)));
    let uid = uid_str
        .parse::<u32>()
        .map_err(|_| ShellError::Usage(format!("chown: invalid uid '{uid_str}'")))?;
    let gid = gid_str
        .map(|g| {
            g.parse::<u32>()
                .map_err(|_| ShellError::Usage(format!("chown: invalid gid '{g}'")))
        })
        .transpose()?;

    let handle = resolve(session, &args[1]).await?;
    let nfs = session.nfs_mut()?;
    let res = nfs
        .setattr(SETATTR3args {
            object: handle.to_nfs_fh3(),
            new_attributes: sattr3 {
                mode: set_mode3::None,
                uid: set_uid3::Some(uid),
                gid: gid.map_or(set_gid3::None, set_gid3::Some),
                size: set_size3::None,
                atime: set_atime::DONT_CHANGE,
                mtime: set_mtime::DONT_CHANGE,
            },
            guard: sattrguard3::None,
        })
        .await?;
    match res {
        Nfs3Result::Ok(_) => Ok(()),
        Nfs3Result::Err((stat, _)) => Err(ShellError::Usage(describe_nfsstat3(stat).to_string())),
    }
}

/// `handle [-T|-U] [-P port] [<hex-byte...>]`: with no argument, print the
/// current directory's handle; with one, open an NFS channel straight to
/// the given handle, skipping MOUNT3 entirely.
async fn cmd_handle(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let mut transport = Transport::Auto;
    let mut options = MountOptions::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(flags) = arg.strip_prefix('-') {
            for flag in flags.chars() {
                match flag {
                    'T' => transport = Transport::Tcp,
                    'U' => transport = Transport::Udp,
                    'P' => {
                        let port = iter
                            .next()
                            .ok_or_else(|| {
                                ShellError::Usage("handle: -P requires a port argument".to_string())
                            })?
                            .parse::<u16>()
                            .map_err(|_| ShellError::Usage("handle: -P port must be a number".to_string()))?;
                        options.nfs_port_override = Some(port);
                    }
                    other => {
                        return Err(ShellError::Usage(format!("handle: unknown flag -{other}")));
                    }
                }
            }
        } else {
            positional.push(arg.clone());
        }
    }

    let Some(hex) = positional.first() else {
        let handle = session
            .cwd_handle()
            .ok_or(ShellError::NotReady("not mounted"))?;
        println!("{handle}");
        return Ok(());
    };

    let bytes = parse_hex_handle(hex)?;
    if bytes.len() > nfs3_types::nfs3::NFS3_FHSIZE {
        return Err(ShellError::Usage(format!(
            "handle: too long ({} bytes, max {})",
            bytes.len(),
            nfs3_types::nfs3::NFS3_FHSIZE
        )));
    }

    if session.cwd_handle().is_some() {
        session.set_cwd(Handle(bytes), "<handle>".to_string());
        return Ok(());
    }

    session.use_handle(bytes, transport, options).await
}

fn parse_hex_handle(hex: &str) -> Result<Vec<u8>, ShellError> {
    if hex.len() % 2 != 0 {
        return Err(ShellError::Usage("handle: odd number of hex digits".to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ShellError::Usage(format!("handle: invalid hex byte '{}'", &hex[i..i + 2])))
        })
        .collect()
}

async fn cmd_mount(session: &mut Session, args: &[String]) -> Result<(), ShellError> {
    let mut transport = Transport::Auto;
    let mut options = MountOptions::default();
    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if let Some(flags) = arg.strip_prefix('-') {
            for flag in flags.chars() {
                match flag {
                    'T' => transport = Transport::Tcp,
                    'U' => transport = Transport::Udp,
                    'u' => options.unmount_after = true,
                    'p' => options.thru_portmap = true,
                    'P' => {
                        let port = iter
                            .next()
                            .ok_or_else(|| {
                                ShellError::Usage("mount: -P requires a port argument".to_string())
                            })?
                            .parse::<u16>()
                            .map_err(|_| ShellError::Usage("mount: -P port must be a number".to_string()))?;
                        options.nfs_port_override = Some(port);
                    }
                    other => {
                        return Err(ShellError::Usage(format!("mount: unknown flag -{other}")));
                    }
                }
            }
        } else {
            positional.push(arg.clone());
        }
    }
    let path = positional
        .first()
        .ok_or_else(|| ShellError::Usage("usage: mount [-u] [-p] [-T|-U] [-P port] <path>".to_string()))?;
    session.mount(path, transport, options).await
}

fn cmd_umount(session: &mut Session) {
    session.unmount();
}

async fn connect_mount_client(
    host: &str,
    control: nfs3_client::control::ChannelControl,
) -> Result<nfs3_client::MountClient<nfs3_client::tokio::TokioIo<tokio::net::TcpStream>>, ShellError>
{
    use nfs3_client::net::Connector as _;
    let connector = nfs3_client::tokio::TokioConnector;
    let portmap_io = connector.connect(host, nfs3_types::portmap::PMAP_PORT).await?;
    let mut portmapper =
        nfs3_client::PortmapperClient::new_with_control(portmap_io, control.clone());
    let mount_port = portmapper
        .getport(nfs3_types::mount::PROGRAM, nfs3_types::mount::VERSION)
        .await?;
    let mount_io = connector.connect(host, mount_port as u16).await?;
    Ok(nfs3_client::MountClient::new_with_control(
        mount_io,
        Default::default(),
        Default::default(),
        control,
    ))
}

async fn cmd_umountall(session: &mut Session) -> Result<(), ShellError> {
    let host = session
        .host()
        .ok_or(ShellError::Usage("umountall: no host specified".to_string()))?
        .to_string();
    let control = nfs3_client::control::ChannelControl::new(session.cancel_cell());
    let mut mount_client = connect_mount_client(&host, control).await?;
    mount_client.umntall().await?;
    session.unmount();
    Ok(())
}

async fn cmd_export(session: &mut Session) -> Result<(), ShellError> {
    let host = session
        .host()
        .ok_or(ShellError::Usage("export: no host specified".to_string()))?
        .to_string();
    let control = nfs3_client::control::ChannelControl::new(session.cancel_cell());
    let mut mount_client = connect_mount_client(&host, control).await?;
    let exports = mount_client.export().await?;
    for node in exports.0 {
        let dir = String::from_utf8_lossy(node.ex_dir.0.as_ref()).into_owned();
        let groups: Vec<String> = node
            .ex_groups
            .0
            .into_iter()
            .map(|g| String::from_utf8_lossy(g.0.as_ref()).into_owned())
            .collect();
        println!("{dir} {}", groups.join(","));
    }
    Ok(())
}

async fn cmd_dump(session: &mut Session) -> Result<(), ShellError> {
    let host = session
        .host()
        .ok_or(ShellError::Usage("dump: no host specified".to_string()))?
        .to_string();
    let control = nfs3_client::control::ChannelControl::new(session.cancel_cell());
    let mut mount_client = connect_mount_client(&host, control).await?;
    let list = mount_client.dump().await?;
    for entry in list.0 {
        let hostname = String::from_utf8_lossy(entry.ml_hostname.0.as_ref()).into_owned();
        let directory = String::from_utf8_lossy(entry.ml_directory.0.as_ref()).into_owned();
        println!("{hostname}:{directory}");
    }
    Ok(())
}

fn cmd_status(session: &mut Session) {
    match session.host() {
        Some(host) => println!("host {host}, cwd {}", session.cwd_path()),
        None => println!("no host set"),
    }
    println!(
        "uid={} gid={}",
        session.identity().uid,
        session.identity().gid
    );
    if session.cwd_handle().is_some() {
        println!(
            "Transfer size: read {}, write {}",
            session.rtmax(),
            session.wtmax()
        );
    }
}
