//! Commands the shell always provides.

use core::cell::Cell;

use crc32fast::Hasher;

use super::{Command, Error, Handler, Shell, Watch};
use crate::storage::{ReadStorage, Storage};
use crate::system::param::{CHUNK_SIZE, Value};
use crate::system::path::{self, Location, Match};
use crate::transport::Transport;

/// Size reported by `ll` for directories and commands.
const BLOCK_SIZE: usize = 4096;

/// Shell built-in commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `cat <path>`: print a parameter.
    Cat,
    /// `cd <dir>`: change the working directory.
    Cd,
    /// `echo <words>` or `echo <value> > <path>`.
    Echo,
    /// `loadpar`: read every parameter back from storage.
    LoadPar,
    /// `ll [dir]`: long listing.
    ListLong,
    /// `ls [dir]`: short listing.
    List,
    /// `savepar`: write every parameter to storage.
    SavePar,
    /// `watch cat <path>`: print a parameter periodically.
    Watch,
    /// `watchcsv cat <path>`: like `watch`, separated by `;`.
    WatchCsv,
}

impl Builtin {
    /// Every built-in, in table order.
    pub const ALL: [Command; 9] = [
        Builtin::Cat.command(),
        Builtin::Cd.command(),
        Builtin::Echo.command(),
        Builtin::LoadPar.command(),
        Builtin::ListLong.command(),
        Builtin::List.command(),
        Builtin::SavePar.command(),
        Builtin::Watch.command(),
        Builtin::WatchCsv.command(),
    ];

    /// Name typed by the operator.
    pub const fn name(self) -> &'static str {
        match self {
            Builtin::Cat => "cat",
            Builtin::Cd => "cd",
            Builtin::Echo => "echo",
            Builtin::LoadPar => "loadpar",
            Builtin::ListLong => "ll",
            Builtin::List => "ls",
            Builtin::SavePar => "savepar",
            Builtin::Watch => "watch",
            Builtin::WatchCsv => "watchcsv",
        }
    }

    const fn command(self) -> Command {
        Command {
            name: self.name(),
            handler: Handler::Builtin(self),
        }
    }
}

impl<T: Transport, S: Storage> Shell<'_, T, S> {
    pub(super) fn run_builtin(&mut self, builtin: Builtin, args: &[&str]) {
        let result = match builtin {
            Builtin::Cat => self.cat(args).map(|_| ()),
            Builtin::Cd => self.change_directory(args),
            Builtin::Echo => self.echo(args),
            Builtin::LoadPar => self.load_params(),
            Builtin::ListLong => self.list(args, true),
            Builtin::List => self.list(args, false),
            Builtin::SavePar => self.save_params(),
            Builtin::Watch => self.start_watch(args, false),
            Builtin::WatchCsv => self.start_watch(args, true),
        };
        if let Err(error) = result {
            self.report(builtin.name(), error);
        }
    }

    /// Print a parameter followed by `;` or a line break.
    pub(super) fn print_param(&mut self, index: usize, csv: bool) {
        let params = self.params;
        let Some(param) = params.get(index) else {
            return;
        };
        if let Some(hook) = param.pre_read {
            hook(param.id);
        }
        match param.value {
            Value::Text(slot) => self.output_text(slot),
            value => out!(self, "{}", value),
        }
        self.output(if csv { ";" } else { "\r\n" });
    }

    /// Send a text slot as stored, up to its terminator.
    fn output_text(&mut self, slot: &[Cell<u8>]) {
        let mut buf = [0u8; CHUNK_SIZE];
        for cells in slot.chunks(CHUNK_SIZE) {
            let len = cells.iter().position(|cell| cell.get() == 0).unwrap_or(cells.len());
            for (b, cell) in buf.iter_mut().zip(&cells[..len]) {
                *b = cell.get();
            }
            self.output_bytes(&buf[..len]);
            if len < cells.len() {
                break;
            }
        }
    }

    fn find_param(&self, path: &str) -> Result<usize, Error> {
        path::resolve_parameter(self.params, path, self.cwd, Match::Exact, 0).ok_or(Error::NotFound)
    }

    fn cat(&mut self, args: &[&str]) -> Result<usize, Error> {
        let path = args.first().ok_or(Error::NotFound)?;
        let index = self.find_param(path)?;
        self.print_param(index, false);
        Ok(index)
    }

    fn change_directory(&mut self, args: &[&str]) -> Result<(), Error> {
        let path = args.first().ok_or(Error::NotFound)?;
        self.cwd = path::resolve_directory(path, self.cwd).ok_or(Error::NotFound)?;
        debug!("cd: now in {}", path);
        Ok(())
    }

    fn echo(&mut self, args: &[&str]) -> Result<(), Error> {
        if let [value, ">", target] = args {
            let index = self.find_param(target)?;
            let param = &self.params[index];
            if !param.is_writable() {
                return Err(Error::ReadOnly);
            }
            param.value.assign(value);
            if let Some(hook) = param.post_write {
                hook(param.id);
            }
            return Ok(());
        }

        for arg in args {
            self.output(arg);
            self.output(" ");
        }
        self.output("\r\n");
        Ok(())
    }

    fn list(&mut self, args: &[&str], long: bool) -> Result<(), Error> {
        let dir = match args.first() {
            Some(path) => path::resolve_directory(path, self.cwd).ok_or(Error::NotFound)?,
            None => self.cwd,
        };

        match dir {
            Location::Root => {
                for name in path::DIRECTORIES {
                    if long {
                        self.long_entry(true, true, BLOCK_SIZE, name);
                    } else {
                        self.output(name);
                        self.output("\t");
                    }
                }
                self.output("\r\n");
            }
            Location::Dir(path::BIN) => {
                for i in 0..self.commands.len() {
                    let name = self.commands[i].name;
                    if long {
                        self.long_entry(false, true, BLOCK_SIZE, name);
                    } else {
                        self.output(name);
                        self.output("\r\n");
                    }
                }
            }
            Location::Dir(path::DEV) => {
                let params = self.params;
                for param in params {
                    if long {
                        self.long_entry(false, param.is_writable(), param.value.storage_size(), param.name);
                    } else {
                        self.output(param.name);
                        self.output("\r\n");
                    }
                }
            }
            Location::Dir(_) => {}
        }
        Ok(())
    }

    fn long_entry(&mut self, dir: bool, writable: bool, size: usize, name: &str) {
        out!(
            self,
            "{}r{}xr-xr-x\t2 root\troot\t{} {} {}\r\n",
            if dir { 'd' } else { '-' },
            if writable { 'w' } else { '-' },
            size,
            self.config.build_date,
            name
        );
    }

    fn start_watch(&mut self, args: &[&str], csv: bool) -> Result<(), Error> {
        let [verb, _] = args else {
            return Ok(());
        };
        if *verb != Builtin::Cat.name() {
            return Ok(());
        }

        match self.cat(&args[1..]) {
            Ok(index) => {
                info!("watch mode on");
                self.watch = Some(Watch { index, csv, last: None });
            }
            Err(error) => self.report(Builtin::Cat.name(), error),
        }
        Ok(())
    }

    fn save_params(&mut self) -> Result<(), Error> {
        let mut crc = Hasher::new();
        let mut offset = 0;
        let storage = &mut self.storage;

        for param in self.params {
            param
                .value
                .write_to(|at, bytes| {
                    crc.update(bytes);
                    storage.write(address(offset + at)?, bytes).map_err(|_| Error::Storage)
                })
                .inspect_err(|_| warn!("savepar: write failed"))?;
            offset += param.value.storage_size();
        }

        if self.config.param_checksum {
            let trailer = crc.finalize().to_le_bytes();
            self.storage
                .write(address(offset)?, &trailer)
                .map_err(|_| Error::Storage)?;
        }
        info!("savepar: {} bytes", offset);
        Ok(())
    }

    fn load_params(&mut self) -> Result<(), Error> {
        if self.config.param_checksum {
            self.verify_checksum()?;
        }

        let mut offset = 0;
        let storage = &mut self.storage;
        for param in self.params {
            param
                .value
                .read_from(|at, bytes| storage.read(address(offset + at)?, bytes).map_err(|_| Error::Storage))
                .inspect_err(|_| warn!("loadpar: read failed"))?;
            offset += param.value.storage_size();
        }
        info!("loadpar: {} bytes", offset);
        Ok(())
    }

    fn verify_checksum(&mut self) -> Result<(), Error> {
        let total: usize = self.params.iter().map(|param| param.value.storage_size()).sum();
        let mut crc = Hasher::new();
        let mut buf = [0u8; CHUNK_SIZE];
        let mut offset = 0;

        while offset < total {
            let chunk = &mut buf[..(total - offset).min(CHUNK_SIZE)];
            self.storage
                .read(address(offset)?, chunk)
                .map_err(|_| Error::Storage)?;
            crc.update(chunk);
            offset += chunk.len();
        }

        let mut trailer = [0u8; 4];
        self.storage
            .read(address(total)?, &mut trailer)
            .map_err(|_| Error::Storage)?;
        if u32::from_le_bytes(trailer) != crc.finalize() {
            warn!("loadpar: checksum mismatch");
            return Err(Error::ChecksumMismatch);
        }
        Ok(())
    }
}

fn address(offset: usize) -> Result<u32, Error> {
    u32::try_from(offset).map_err(|_| Error::Storage)
}
