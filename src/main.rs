use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;
use vshell::command::Command;
use vshell::{DestinationBase, EditMode, EntryKind, Outcome, Session};

#[derive(Parser)]
#[command(name = "vsh")]
#[command(about = "A virtual shell over a sandboxed directory", long_about = None)]
struct Cli {
    /// Root directory of the shell; created if missing. Prompted for when omitted.
    #[arg(long, value_name = "PATH")]
    root: Option<PathBuf>,

    /// What relative copy/move destinations are resolved against.
    #[arg(long, value_enum, default_value_t = DestBase::Process)]
    dest_base: DestBase,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum DestBase {
    /// The directory vsh was started from.
    Process,
    /// The current directory inside the shell.
    Cursor,
}

impl From<DestBase> for DestinationBase {
    fn from(base: DestBase) -> Self {
        match base {
            DestBase::Process => DestinationBase::ProcessDir,
            DestBase::Cursor => DestinationBase::Cursor,
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
    let cli = Cli::parse();

    let stdin = io::stdin();
    let mut input = stdin.lock().lines();

    let root = match cli.root {
        Some(root) => root,
        None => match prompt(&mut input, "Enter the root path for the file system: ")? {
            Some(line) => PathBuf::from(line),
            None => return Ok(()),
        },
    };

    let mut session = Session::new(root)?;
    session.set_destination_base(cli.dest_base.into());

    while let Some(line) = prompt(&mut input, "Enter a command: ")? {
        let command = Command::parse(&line);
        if command == Command::Exit {
            break;
        }
        if let Err(err) = dispatch(&mut session, command, &mut input) {
            error!("{:#}", err);
            println!("Error: {:#}", err);
        }
    }

    Ok(())
}

fn prompt<I>(input: &mut I, text: &str) -> io::Result<Option<String>>
where
    I: Iterator<Item = io::Result<String>>,
{
    print!("{}", text);
    io::stdout().flush()?;
    input.next().transpose()
}

fn dispatch<I>(session: &mut Session, command: Command, input: &mut I) -> vshell::Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    match command {
        Command::Pwd => report(&session.pwd()),
        Command::List => {
            let outcome = session.list_basic()?;
            report(&outcome);
            for (name, kind) in outcome.value().into_iter().flatten() {
                match kind {
                    EntryKind::File => println!("File: {}", name),
                    EntryKind::Directory => println!("Directory: {}", name),
                }
            }
        }
        Command::ListDetailed => {
            let outcome = session.list_detailed()?;
            report(&outcome);
            for meta in outcome.value().into_iter().flatten() {
                println!("{}: {}\n{}\n", meta.kind(), meta.name(), meta);
            }
        }
        Command::Create(name) => report(&session.create_file(&name, "")?),
        Command::Mkdir(name) => report(&session.create_directory(&name)?),
        Command::Rm(name) => report(&session.remove_file(&name)?),
        Command::Rmdir(name) => report(&session.remove_directory(&name)?),
        Command::Cd(token) => {
            let outcome = session.cd(&token)?;
            if !outcome.is_success() {
                report(&outcome);
            }
        }
        Command::Rename(old, new) => report(&session.rename(&old, &new)?),
        Command::Move(src, dst) => report(&session.move_entry(&src, &dst)?),
        Command::Copy(src, dst) => report(&session.copy(&src, &dst)?),
        Command::Cat(name) => {
            let outcome = session.read_file(&name)?;
            match outcome.value() {
                Some(content) => println!("{}", String::from_utf8_lossy(content)),
                None => report(&outcome),
            }
        }
        Command::Echo(name, text) => report(&session.write_file(&name, &text)?),
        Command::Nano(name) => nano(session, &name, input)?,
        Command::Chmod(name, mode) => report(&session.set_permissions(&name, &mode)?),
        Command::Perms(name) => report(&session.get_permissions(&name)?),
        Command::Stat(name) => report(&session.stat(&name)?),
        Command::Exit => {}
        Command::Invalid => println!("Invalid command."),
    }
    Ok(())
}

fn nano<I>(session: &mut Session, name: &str, input: &mut I) -> vshell::Result<()>
where
    I: Iterator<Item = io::Result<String>>,
{
    let existing = session.read_file(name)?;
    let Some(content) = existing.value() else {
        report(&existing);
        return Ok(());
    };
    println!("Existing content:\n {}", String::from_utf8_lossy(content));
    println!("Do you want to (a)ppend or (o)verwrite the content?");

    let Some(choice) = input.next().transpose()? else {
        return Ok(());
    };
    let mode = match choice.parse::<EditMode>() {
        Ok(mode) => mode,
        Err(failure) => {
            println!("{}", failure);
            return Ok(());
        }
    };

    println!("Enter new content (type 'exit' on a new line to save and exit):");
    let lines = input.map_while(|line| line.ok());
    report(&session.edit_file(name, mode, lines)?);
    Ok(())
}

fn report<T>(outcome: &Outcome<T>) {
    println!("{}", outcome.message());
}
