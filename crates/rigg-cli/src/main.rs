//! rigg CLI entry point: the tree-value smoke driver.
//!
//! Usage:
//!   rigg local [--sudo] [--workdir PATH]
//!   rigg ssh <user@host[:port]> [OPTIONS]
//!   rigg adb <serial> [--workdir PATH]
//!   rigg qemu <user@host:port> [OPTIONS] [--poweroff]
//!
//! Drives the chosen backend through a fixed scenario: create a scratch
//! directory, write three small values (two with trailing blank-line
//! padding), read the tree back flat, remove the directory, and compare
//! the normalized round trip.

use std::collections::BTreeMap;
use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rigg_target::naming::UniqueNames;
use rigg_target::shell::posix_basename;
use rigg_target::{
    AdbConfig, ConnectionConfig, LocalConfig, QemuConfig, SshConfig, Target, TargetConfig,
};

fn main() -> ExitCode {
    // Initialize tracing (respects RUST_LOG env var)
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None | Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("rigg {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("local") => {
            let opts = Options::parse(&args[2..])?;
            let connection = ConnectionConfig::Local(LocalConfig { sudo: opts.sudo });
            run_scenario(config(connection, &opts, "/tmp/rigg-target"), false).await
        }

        Some("ssh") => {
            let spec = args.get(2).context("ssh requires a user@host[:port] argument")?;
            let opts = Options::parse(&args[3..])?;
            let connection = ConnectionConfig::Ssh(ssh_config(spec, &opts)?);
            run_scenario(config(connection, &opts, "/tmp/rigg-target"), false).await
        }

        Some("adb") => {
            let serial = args.get(2).context("adb requires a device serial argument")?;
            let opts = Options::parse(&args[3..])?;
            let connection = ConnectionConfig::Adb(AdbConfig {
                serial: serial.clone(),
            });
            run_scenario(
                config(connection, &opts, "/data/local/tmp/rigg-target"),
                false,
            )
            .await
        }

        Some("qemu") => {
            let spec = args.get(2).context("qemu requires a user@host:port argument")?;
            let opts = Options::parse(&args[3..])?;
            let connection = ConnectionConfig::Qemu(QemuConfig {
                ssh: ssh_config(spec, &opts)?,
            });
            run_scenario(config(connection, &opts, "/tmp/rigg-target"), opts.poweroff).await
        }

        Some(unknown) => {
            eprintln!("Unknown backend: {unknown}");
            eprintln!("Run 'rigg --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Flags shared by every backend.
#[derive(Debug, Default)]
struct Options {
    workdir: Option<String>,
    password: Option<String>,
    keyfile: Option<String>,
    insecure_host_key: bool,
    sudo: bool,
    poweroff: bool,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self> {
        let mut opts = Self::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--workdir" => {
                    opts.workdir = Some(
                        iter.next()
                            .context("--workdir requires a path argument")?
                            .clone(),
                    )
                }
                "--password" => {
                    opts.password = Some(
                        iter.next()
                            .context("--password requires an argument")?
                            .clone(),
                    )
                }
                "--keyfile" => {
                    opts.keyfile = Some(
                        iter.next()
                            .context("--keyfile requires a path argument")?
                            .clone(),
                    )
                }
                "--insecure-host-key" => opts.insecure_host_key = true,
                "--sudo" => opts.sudo = true,
                "--poweroff" => opts.poweroff = true,
                unknown => bail!("unknown option: {unknown}"),
            }
        }
        Ok(opts)
    }
}

fn config(connection: ConnectionConfig, opts: &Options, default_workdir: &str) -> TargetConfig {
    let workdir = opts.workdir.as_deref().unwrap_or(default_workdir);
    TargetConfig::new(connection, workdir)
}

fn ssh_config(spec: &str, opts: &Options) -> Result<SshConfig> {
    let (username, rest) = spec
        .split_once('@')
        .with_context(|| format!("expected user@host[:port], got {spec:?}"))?;
    let (host, port) = match rest.split_once(':') {
        Some((host, port)) => (
            host,
            port.parse::<u16>()
                .with_context(|| format!("invalid port in {spec:?}"))?,
        ),
        None => (rest, 22),
    };

    let mut ssh = SshConfig::new(host, username);
    ssh.port = port;
    ssh.password = opts.password.clone();
    ssh.keyfile = opts.keyfile.clone();
    ssh.strict_host_check = !opts.insecure_host_key;
    ssh.sudo = opts.sudo;
    Ok(ssh)
}

async fn run_scenario(config: TargetConfig, poweroff: bool) -> Result<ExitCode> {
    let target = Target::connect(config)
        .await
        .context("failed to connect target")?;
    println!(
        "{}: {}/{}",
        target.kind(),
        target.os(),
        target.hostname()
    );

    let data: BTreeMap<&str, &str> = [("test1", "1"), ("test2", "2\n\n"), ("test3", "3\n\n4\n\n")]
        .into_iter()
        .collect();

    let names = UniqueNames::new("rigg-test");
    let dirname = names.next_name();

    println!("creating {dirname}...");
    target.makedirs(&dirname).await?;

    for (key, value) in &data {
        let path = format!("{dirname}/{key}");
        println!("writing {value:?} to {path}...");
        target
            .write_value(&path, value, false, target.connected_as_root())
            .await?;
    }

    println!("reading values back...");
    let raw = target.read_tree_values_flat(&dirname).await?;
    let result: BTreeMap<String, String> = raw
        .iter()
        .map(|(path, value)| (posix_basename(path).to_string(), value.clone()))
        .collect();

    println!("removing {dirname}...");
    target.remove(&dirname).await?;
    target.teardown().await?;

    if poweroff {
        println!("powering off guest...");
        target.execute("poweroff").await?;
    }

    let expected: BTreeMap<String, String> = data
        .iter()
        .map(|(key, value)| (key.to_string(), value.trim().to_string()))
        .collect();

    if result == expected {
        println!("OK: {} values round-tripped", result.len());
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("MISMATCH:\n  expected: {expected:?}\n  got:      {result:?}");
        Ok(ExitCode::FAILURE)
    }
}

fn print_help() {
    println!(
        r#"rigg v{}: drive a target through the tree-value smoke scenario

Usage:
  rigg local [--sudo] [--workdir PATH]
  rigg ssh <user@host[:port]> [--password PW] [--keyfile PATH]
           [--insecure-host-key] [--sudo] [--workdir PATH]
  rigg adb <serial> [--workdir PATH]
  rigg qemu <user@host:port> [--password PW] [--insecure-host-key]
           [--workdir PATH] [--poweroff]

Options:
  --workdir PATH        Scratch directory on the target
                        (default /tmp/rigg-target, adb /data/local/tmp/rigg-target)
  --password PW         SSH password auth (routed through sshpass)
  --keyfile PATH        SSH identity file
  --insecure-host-key   Disable host key checking
  --sudo                Allow passwordless-sudo elevation
  --poweroff            Power the guest off after the scenario (qemu only)

Set RUST_LOG=debug to see every command sent to the transport."#,
        env!("CARGO_PKG_VERSION")
    );
}
