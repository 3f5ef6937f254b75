use std::fmt;
use std::path::PathBuf;

use bon::Builder;

use crate::error::Error;
use crate::error::Result;
use crate::instance::Instance;

/// User-supplied connection options. Never modified while building commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
pub struct SshOptions {
    /// Remote user, rendered as `user@host`.
    pub user: Option<String>,

    /// Private key passed with `-i`.
    #[builder(into)]
    pub key_file: Option<PathBuf>,

    /// Suppress ssh warnings and banners with `-q`.
    #[builder(default)]
    pub quiet: bool,

    /// Comma-separated values each passed with `-o`.
    pub extra_options: Option<String>,

    /// Always relay through a jump host.
    #[builder(default)]
    pub use_jump_host: bool,
}

/// Options as they actually applied to a built command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveOptions {
    pub quiet: bool,
    pub via_jump_host: bool,
}

/// Ordered argument vector for an external process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshCommand {
    argv: Vec<String>,
    effective: EffectiveOptions,
}

impl SshCommand {
    #[must_use]
    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    #[must_use]
    pub fn effective(&self) -> EffectiveOptions {
        self.effective
    }
}

impl fmt::Display for SshCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&shell_line(&self.argv))
    }
}

/// Builds the `ssh` invocation for `host`, optionally relayed through
/// `jump_host`. `trailing` is appended verbatim, one argument per element.
///
/// Argument order:
///
/// 1. `ssh`
/// 2. `-o "ForwardAgent yes"` with a jump host, which also forces quiet mode
/// 3. `-i <key_file>`
/// 4. `-o "ProxyCommand ..." -o StrictHostKeyChecking=no` with a jump host
/// 5. `-q`
/// 6. `[user@]host`
/// 7. `-o <entry>` per comma-separated extra option
/// 8. trailing arguments
///
/// # Errors
///
/// - [`Error::MissingJumpHostAddress`] if the jump host has no public address
pub fn build_args(
    host: &str,
    jump_host: Option<&Instance>,
    options: &SshOptions,
    trailing: &[String],
) -> Result<SshCommand> {
    let via_jump_host = jump_host.is_some();
    let quiet = options.quiet || via_jump_host;

    let mut argv = vec!["ssh".to_owned()];

    if via_jump_host {
        argv.push("-o".to_owned());
        argv.push("ForwardAgent yes".to_owned());
    }

    if let Some(key_file) = &options.key_file {
        argv.push("-i".to_owned());
        argv.push(key_file.display().to_string());
    }

    if let Some(jump_host) = jump_host {
        argv.push("-o".to_owned());
        argv.push(proxy_command(jump_host, options)?);
        argv.push("-o".to_owned());
        argv.push("StrictHostKeyChecking=no".to_owned());
    }

    if quiet {
        argv.push("-q".to_owned());
    }

    argv.push(destination(options.user.as_deref(), host));

    for entry in extra_options(options) {
        argv.push("-o".to_owned());
        argv.push(entry.to_owned());
    }

    argv.extend(trailing.iter().cloned());

    Ok(SshCommand {
        argv,
        effective: EffectiveOptions {
            quiet,
            via_jump_host,
        },
    })
}

/// Local and remote ends of a port forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TunnelPorts {
    pub local: u16,
    pub remote: u16,
}

impl Default for TunnelPorts {
    fn default() -> Self {
        Self {
            local: 4000,
            remote: 8080,
        }
    }
}

/// Builds an `ssh` invocation that forwards `ports.local` to
/// `remote_host:ports.remote` through `jump_host`, without a login shell.
///
/// # Errors
///
/// - [`Error::MissingJumpHostAddress`] if the jump host has no public address
pub fn build_tunnel_args(
    remote_host: &str,
    jump_host: &Instance,
    options: &SshOptions,
    ports: TunnelPorts,
) -> Result<SshCommand> {
    let jump_address = jump_host_address(jump_host)?;

    let mut argv = vec!["ssh".to_owned(), "-nNT".to_owned()];

    if let Some(key_file) = &options.key_file {
        argv.push("-i".to_owned());
        argv.push(key_file.display().to_string());
    }

    argv.push("-L".to_owned());
    argv.push(format!("{}:{remote_host}:{}", ports.local, ports.remote));
    argv.push("-o".to_owned());
    argv.push("StrictHostKeyChecking=no".to_owned());
    argv.push("-o".to_owned());
    argv.push("ExitOnForwardFailure=yes".to_owned());
    argv.push(destination(options.user.as_deref(), jump_address));

    Ok(SshCommand {
        argv,
        effective: EffectiveOptions {
            quiet: options.quiet,
            via_jump_host: true,
        },
    })
}

/// Joins arguments into one line for a shell script. Arguments containing
/// whitespace are wrapped in single quotes.
#[must_use]
pub fn shell_line<S: AsRef<str>>(argv: &[S]) -> String {
    argv.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            if arg.contains(char::is_whitespace) {
                format!("'{arg}'")
            } else {
                arg.to_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn proxy_command(jump_host: &Instance, options: &SshOptions) -> Result<String> {
    let jump_address = jump_host_address(jump_host)?;

    let mut parts = vec!["ProxyCommand ssh".to_owned()];
    if let Some(key_file) = &options.key_file {
        parts.push(format!("-i {}", key_file.display()));
    }
    parts.push("-W %h:%p".to_owned());
    parts.push(destination(options.user.as_deref(), jump_address));

    Ok(parts.join(" "))
}

fn jump_host_address(jump_host: &Instance) -> Result<&str> {
    jump_host
        .public_address()
        .ok_or_else(|| Error::MissingJumpHostAddress {
            jump_host: jump_host.to_string(),
        })
}

fn destination(user: Option<&str>, host: &str) -> String {
    match user {
        Some(user) => format!("{user}@{host}"),
        None => host.to_owned(),
    }
}

fn extra_options(options: &SshOptions) -> impl Iterator<Item = &str> {
    options
        .extra_options
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

#[cfg(test)]
mod tests {
    use rstest::fixture;
    use rstest::rstest;

    use super::*;

    #[fixture]
    fn jump_host() -> Instance {
        Instance::builder()
            .id("i-jump")
            .location("us-east")
            .public_address("5.6.7.8")
            .build()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn bare_host() {
        let got = build_args("10.0.0.5", None, &SshOptions::default(), &[]).unwrap();
        assert_eq!(got.argv(), strings(&["ssh", "10.0.0.5"]));
        assert!(!got.effective().quiet);
    }

    #[test]
    fn direct_with_everything() {
        let options = SshOptions::builder()
            .user("ec2-user")
            .key_file("/keys/id_rsa")
            .quiet(true)
            .extra_options("ServerAliveInterval=30,ConnectTimeout=5")
            .build();
        let trailing = strings(&["uptime -p"]);
        let got = build_args("1.2.3.4", None, &options, &trailing).unwrap();
        assert_eq!(
            got.argv(),
            strings(&[
                "ssh",
                "-i",
                "/keys/id_rsa",
                "-q",
                "ec2-user@1.2.3.4",
                "-o",
                "ServerAliveInterval=30",
                "-o",
                "ConnectTimeout=5",
                "uptime -p",
            ])
        );
    }

    #[rstest]
    fn jump_host_with_everything(jump_host: Instance) {
        let options = SshOptions::builder()
            .user("admin")
            .key_file("/keys/id_rsa")
            .extra_options("LogLevel=ERROR")
            .build();
        let got = build_args("10.0.0.5", Some(&jump_host), &options, &[]).unwrap();
        assert_eq!(
            got.argv(),
            strings(&[
                "ssh",
                "-o",
                "ForwardAgent yes",
                "-i",
                "/keys/id_rsa",
                "-o",
                "ProxyCommand ssh -i /keys/id_rsa -W %h:%p admin@5.6.7.8",
                "-o",
                "StrictHostKeyChecking=no",
                "-q",
                "admin@10.0.0.5",
                "-o",
                "LogLevel=ERROR",
            ])
        );
    }

    #[rstest]
    fn jump_host_minimal(jump_host: Instance) {
        let got = build_args("10.0.0.5", Some(&jump_host), &SshOptions::default(), &[]).unwrap();
        assert_eq!(
            got.argv(),
            strings(&[
                "ssh",
                "-o",
                "ForwardAgent yes",
                "-o",
                "ProxyCommand ssh -W %h:%p 5.6.7.8",
                "-o",
                "StrictHostKeyChecking=no",
                "-q",
                "10.0.0.5",
            ])
        );
    }

    /// Every combination of options keeps the documented order and pairs each
    /// `-o` with a value.
    #[rstest]
    fn order_holds_for_all_combinations(
        jump_host: Instance,
        #[values(false, true)] key_file: bool,
        #[values(false, true)] user: bool,
        #[values(false, true)] quiet: bool,
        #[values(false, true)] via_jump_host: bool,
        #[values(false, true)] extra: bool,
    ) {
        let options = SshOptions::builder()
            .maybe_key_file(key_file.then_some("/k"))
            .maybe_user(user.then_some("u"))
            .quiet(quiet)
            .maybe_extra_options(extra.then_some("A=1,B=2"))
            .build();
        let jump = via_jump_host.then_some(&jump_host);
        let trailing = strings(&["echo", "hi"]);
        let got = build_args("h", jump, &options, &trailing).unwrap();
        let argv = got.argv();

        let mut should = vec!["ssh".to_owned()];
        if via_jump_host {
            should.extend(strings(&["-o", "ForwardAgent yes"]));
        }
        if key_file {
            should.extend(strings(&["-i", "/k"]));
        }
        if via_jump_host {
            let user_prefix = if user { "u@" } else { "" };
            let key = if key_file { "-i /k " } else { "" };
            should.push("-o".to_owned());
            should.push(format!("ProxyCommand ssh {key}-W %h:%p {user_prefix}5.6.7.8"));
            should.extend(strings(&["-o", "StrictHostKeyChecking=no"]));
        }
        if quiet || via_jump_host {
            should.push("-q".to_owned());
        }
        should.push(if user { "u@h" } else { "h" }.to_owned());
        if extra {
            should.extend(strings(&["-o", "A=1", "-o", "B=2"]));
        }
        should.extend(trailing.clone());
        assert_eq!(argv, should);

        for (i, arg) in argv.iter().enumerate() {
            if arg == "-o" {
                let value = &argv[i + 1];
                assert!(!value.starts_with('-'), "-o followed by {value}");
            }
        }

        assert_eq!(got.effective().quiet, quiet || via_jump_host);
        assert_eq!(got.effective().via_jump_host, via_jump_host);
    }

    #[rstest]
    fn jump_host_forces_quiet_without_touching_options(jump_host: Instance) {
        let options = SshOptions::default();
        let got = build_args("10.0.0.5", Some(&jump_host), &options, &[]).unwrap();
        assert!(got.argv().contains(&"-q".to_owned()));
        assert!(got.effective().quiet);
        assert!(!options.quiet);
    }

    #[test]
    fn jump_host_without_public_address_fails() {
        let jump_host = Instance::builder()
            .id("i-jump")
            .private_address("10.0.0.1")
            .build();
        let got = build_args("10.0.0.5", Some(&jump_host), &SshOptions::default(), &[]);
        match got {
            Err(Error::MissingJumpHostAddress { jump_host }) => assert_eq!(jump_host, "i-jump"),
            other => panic!("expected missing address, got {other:?}"),
        }
    }

    #[test]
    fn blank_extra_options_are_skipped() {
        let options = SshOptions::builder().extra_options("A=1,, ,B=2,").build();
        let got = build_args("h", None, &options, &[]).unwrap();
        assert_eq!(got.argv(), strings(&["ssh", "h", "-o", "A=1", "-o", "B=2"]));
    }

    #[rstest]
    fn tunnel(jump_host: Instance) {
        let options = SshOptions::builder()
            .user("admin")
            .key_file("/keys/id_rsa")
            .build();
        let got = build_tunnel_args("10.0.0.5", &jump_host, &options, TunnelPorts::default())
            .unwrap();
        assert_eq!(
            got.argv(),
            strings(&[
                "ssh",
                "-nNT",
                "-i",
                "/keys/id_rsa",
                "-L",
                "4000:10.0.0.5:8080",
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "ExitOnForwardFailure=yes",
                "admin@5.6.7.8",
            ])
        );
    }

    #[rstest]
    #[case(&["ssh", "-q", "host"], "ssh -q host")]
    #[case(&["ssh", "-o", "ForwardAgent yes", "host"], "ssh -o 'ForwardAgent yes' host")]
    #[case(&["ssh", "-o", "ProxyCommand ssh -W %h:%p 5.6.7.8"], "ssh -o 'ProxyCommand ssh -W %h:%p 5.6.7.8'")]
    #[case(&["a\tb"], "'a\tb'")]
    fn shell_line_quotes_whitespace(#[case] argv: &[&str], #[case] should: &str) {
        assert_eq!(shell_line(argv), should);
    }
}
