use std::io;
use std::io::Write;
use std::process::ExitStatus;
use std::process::Stdio;

use async_trait::async_trait;
use bon::Builder;
use enum_dispatch::enum_dispatch;
use tempfile::TempPath;
use tokio::process::Command;
use tracing::debug;
use tracing::info;
use tracing::instrument;
use tracing::warn;

use crate::command::build_args;
use crate::command::build_tunnel_args;
use crate::command::shell_line;
use crate::command::SshCommand;
use crate::command::SshOptions;
use crate::command::TunnelPorts;
use crate::error::Error;
use crate::error::Result;
use crate::instance::Instance;
use crate::instance::JumpHostSet;
use crate::probe::Probe;
use crate::resolve::AddressResolver;
use crate::select::Selector;

/// Runs external commands to completion with inherited stdio.
#[async_trait]
#[enum_dispatch]
pub trait Launcher: Send + Sync {
    /// Runs `argv` and returns its exit code.
    async fn launch(&self, argv: &[String]) -> Result<i32>;

    /// Writes `script` to an owner-only temporary executable, runs it and
    /// deletes it afterwards.
    async fn launch_script(&self, script: &str) -> Result<i32> {
        let path = write_script(script)?;
        let argv = vec![path.display().to_string()];
        let code = self.launch(&argv).await;
        debug!(path = %path.display(), "removing script");
        drop(path);
        code
    }
}

#[enum_dispatch(Launcher)]
#[derive(Debug, Clone)]
pub enum LauncherImpl {
    Process(ProcessLauncher),
    DryRun(DryRunLauncher),
}

/// Spawns real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

#[async_trait]
impl Launcher for ProcessLauncher {
    async fn launch(&self, argv: &[String]) -> Result<i32> {
        let command = shell_line(argv);
        let Some((program, args)) = argv.split_first() else {
            return Err(Error::Spawn {
                command,
                source: io::Error::new(io::ErrorKind::InvalidInput, "empty command"),
            });
        };

        info!(%command, "launching");
        let status = Command::new(program)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| Error::Spawn { command, source })?;

        let code = exit_code(status);
        debug!(code, "process exited");
        Ok(code)
    }
}

/// Prints what would run instead of running it.
#[derive(Debug, Default, Clone, Copy)]
pub struct DryRunLauncher;

#[async_trait]
impl Launcher for DryRunLauncher {
    async fn launch(&self, argv: &[String]) -> Result<i32> {
        println!("{}", shell_line(argv));
        Ok(0)
    }

    async fn launch_script(&self, script: &str) -> Result<i32> {
        print!("{script}");
        Ok(0)
    }
}

fn write_script(script: &str) -> Result<TempPath> {
    let mut file = tempfile::Builder::new()
        .prefix("hop-tmux-")
        .suffix(".sh")
        .tempfile()?;
    file.write_all(script.as_bytes())?;
    file.flush()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o700))?;
    }

    // Closes the write handle so the file can be executed.
    Ok(file.into_temp_path())
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status
        .code()
        .or_else(|| status.signal().map(|signal| 128 + signal))
        .unwrap_or(1)
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}

/// Drives the connection modes: batch execute, tmux, interactive and tunnel.
///
/// Instances are handled strictly one after another; each process is waited
/// on before the next one starts.
#[derive(Builder)]
pub struct Orchestrator<P, L> {
    resolver: AddressResolver<P>,
    launcher: L,
    #[builder(default)]
    jump_hosts: JumpHostSet,
    #[builder(default)]
    options: SshOptions,
}

impl<P: Probe, L: Launcher> Orchestrator<P, L> {
    #[must_use]
    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Runs `command` on each instance in order.
    ///
    /// Without `keep_going`, the first failure stops the batch: a non-zero
    /// exit code is returned as is, and resolution errors are returned as
    /// errors. With `keep_going`, failures are reported and skipped, and the
    /// result is 0.
    ///
    /// # Errors
    ///
    /// - If an instance can't be resolved and `keep_going` is unset
    /// - If `ssh` can't be spawned
    pub async fn execute(
        &self,
        instances: &[Instance],
        command: &str,
        keep_going: bool,
    ) -> Result<i32> {
        let trailing = [command.to_owned()];

        for instance in instances {
            let (host, ssh) = match self.prepare(instance, &self.options, &trailing).await {
                Ok(prepared) => prepared,
                Err(error) if keep_going => {
                    warn!(%instance, %error, "skipping instance");
                    eprintln!("Skipping {instance}: {error}");
                    continue;
                }
                Err(error) => return Err(error),
            };

            println!("Executing {command} on {host}");
            let code = self.launcher.launch(ssh.argv()).await?;

            if code != 0 {
                if keep_going {
                    warn!(%instance, code, "command failed, continuing");
                    continue;
                }
                eprintln!("Command failed!");
                return Ok(code);
            }
        }

        Ok(0)
    }

    /// Opens one tmux window per instance and attaches to the session.
    ///
    /// # Errors
    ///
    /// - If any instance can't be resolved
    /// - If the script can't be written or run
    pub async fn tmux(&self, instances: &[Instance]) -> Result<i32> {
        let script = self.tmux_script(instances).await?;
        self.launcher.launch_script(&script).await
    }

    /// Generates the shell script used by [`Self::tmux`].
    ///
    /// # Errors
    ///
    /// - If any instance can't be resolved
    pub async fn tmux_script(&self, instances: &[Instance]) -> Result<String> {
        let mut script = String::from("#!/bin/sh\n");
        script.push_str("SESSION=`tmux new-session -d -P`\n");

        for instance in instances {
            let (_host, ssh) = self.prepare(instance, &self.options, &[]).await?;
            script.push_str(&format!(
                "tmux new-window -t ${{SESSION}} -n {} -- {ssh}\n",
                shell_line(&[instance.id()]),
            ));
        }

        script.push_str("tmux kill-window -t ${SESSION}1\n");
        script.push_str("tmux move-window -rt ${SESSION}\n");
        script.push_str("tmux attach-session -t ${SESSION}\n");
        Ok(script)
    }

    /// Logs into one instance, asking `selector` when there is a choice.
    ///
    /// # Errors
    ///
    /// - If the selection is invalid
    /// - If the instance can't be resolved
    /// - If `ssh` can't be spawned
    pub async fn interactive(
        &self,
        instances: &[Instance],
        selector: &mut dyn Selector,
    ) -> Result<i32> {
        let instance = choose(instances, selector)?;
        let (_host, ssh) = self.prepare(instance, &self.options, &[]).await?;
        self.launcher.launch(ssh.argv()).await
    }

    /// Forwards a local port to an instance through its nearest jump host.
    ///
    /// # Errors
    ///
    /// - If the selection is invalid
    /// - If there is no usable jump host
    /// - If `ssh` can't be spawned
    pub async fn tunnel(
        &self,
        instances: &[Instance],
        selector: &mut dyn Selector,
        ports: TunnelPorts,
    ) -> Result<i32> {
        let instance = choose(instances, selector)?;
        let options = SshOptions {
            use_jump_host: true,
            ..self.options.clone()
        };

        let target = self
            .resolver
            .resolve(instance, &self.jump_hosts, &options)
            .await?;
        let jump_host = target.jump_host.as_ref().ok_or(Error::NoJumpHostAvailable)?;
        let ssh = build_tunnel_args(&target.host, jump_host, &options, ports)?;

        println!(
            "Tunneling local port {} to {} on {}\n",
            ports.local,
            ports.remote,
            instance.id()
        );
        println!("http://localhost:{}", ports.local);

        self.launcher.launch(ssh.argv()).await
    }

    #[instrument(skip_all, fields(instance = %instance))]
    async fn prepare(
        &self,
        instance: &Instance,
        options: &SshOptions,
        trailing: &[String],
    ) -> Result<(String, SshCommand)> {
        let target = self
            .resolver
            .resolve(instance, &self.jump_hosts, options)
            .await?;
        let ssh = build_args(&target.host, target.jump_host.as_ref(), options, trailing)?;
        debug!(command = %ssh, "built ssh command");
        Ok((target.host, ssh))
    }
}

fn choose<'a>(instances: &'a [Instance], selector: &mut dyn Selector) -> Result<&'a Instance> {
    if let [only] = instances {
        return Ok(only);
    }
    let index = selector.pick(instances)?;
    instances.get(index).ok_or(Error::InvalidSelection {
        max: instances.len(),
    })
}
