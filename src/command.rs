//! Parsing of one input line into a shell command.
//!
//! One-argument verbs split the line once, so their argument may contain spaces.
//! Two-argument verbs split it into exactly three parts; the last argument keeps any spaces.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pwd,
    List,
    ListDetailed,
    Create(String),
    Mkdir(String),
    Rm(String),
    Rmdir(String),
    Cd(String),
    Rename(String, String),
    Move(String, String),
    Copy(String, String),
    Cat(String),
    /// `echo <file> <text>`
    Echo(String, String),
    Nano(String),
    /// `chmod <name> <octal>`
    Chmod(String, String),
    Perms(String),
    Stat(String),
    Exit,
    Invalid,
}

impl Command {
    pub fn parse(line: &str) -> Command {
        match line {
            "exit" => return Command::Exit,
            "pwd" => return Command::Pwd,
            "ls" => return Command::List,
            "ls -l" => return Command::ListDetailed,
            _ => {}
        }

        let Some((verb, rest)) = line.split_once(' ') else {
            return Command::Invalid;
        };
        let one = || rest.to_string();
        let two = || rest.split_once(' ').map(|(a, b)| (a.to_string(), b.to_string()));

        match verb {
            "create" => Command::Create(one()),
            "mkdir" => Command::Mkdir(one()),
            "rm" => Command::Rm(one()),
            "rmdir" => Command::Rmdir(one()),
            "cd" => Command::Cd(one()),
            "cat" => Command::Cat(one()),
            "nano" => Command::Nano(one()),
            "perms" => Command::Perms(one()),
            "stat" => Command::Stat(one()),
            "rename" => two().map_or(Command::Invalid, |(a, b)| Command::Rename(a, b)),
            "move" => two().map_or(Command::Invalid, |(a, b)| Command::Move(a, b)),
            "copy" => two().map_or(Command::Invalid, |(a, b)| Command::Copy(a, b)),
            "echo" => two().map_or(Command::Invalid, |(a, b)| Command::Echo(a, b)),
            "chmod" => two().map_or(Command::Invalid, |(a, b)| Command::Chmod(a, b)),
            _ => Command::Invalid,
        }
    }
}
