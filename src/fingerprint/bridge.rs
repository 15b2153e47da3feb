//! Cross-process bridge to an external chemistry toolkit.
//!
//! The toolkit runs as a helper process launched once per session. Requests
//! and replies are single lines on the helper's stdin/stdout:
//!
//! ```text
//! -> parse\tCCO
//! <- ok\tm1
//! -> fingerprint\tm1
//! <- ok\t12 80 650 1019
//! -> parse\tnot-a-smiles
//! <- err\tcould not parse SMILES
//! -> quit
//! ```
//!
//! A handle returned by `parse` stays valid at least until the next `parse`.
//! Every request gets exactly one reply line, so an `err` reply leaves the
//! session usable for the next molecule. Anything else (an unexpected line,
//! a malformed payload, EOF, a broken pipe) means replies can no longer be
//! matched to requests: the session is poisoned and every later request
//! fails with [`EngineError::Closed`].

use std::ffi::OsString;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use log::{debug, info, warn};

use super::{ChemistryEngine, EngineError};

/// Opaque handle to a molecule held by the bridge process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeMolecule(String);

impl BridgeMolecule {
    /// Handle token as sent over the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How to launch the bridge helper process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Executable to run
    pub command: OsString,
    /// Arguments passed to the executable
    pub args: Vec<OsString>,
    /// Working directory for the helper (inherits ours when `None`)
    pub working_dir: Option<PathBuf>,
}

impl BridgeConfig {
    /// Config for `command` with no arguments
    pub fn new(command: impl Into<OsString>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Append an argument
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Line protocol spoken over any reader/writer pair
#[derive(Debug)]
pub struct LineProtocol<R, W> {
    reader: R,
    writer: W,
    line: String,
    poisoned: bool,
}

impl<R: BufRead, W: Write> LineProtocol<R, W> {
    /// Speak the protocol over `reader` (replies) and `writer` (requests)
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            line: String::new(),
            poisoned: false,
        }
    }

    /// Whether a protocol or I/O failure has ended the session
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// Split back into the underlying reader and writer
    pub fn into_parts(self) -> (R, W) {
        (self.reader, self.writer)
    }

    /// Run `exchange`, poisoning the session on anything but a clean reply
    fn guarded<T>(
        &mut self,
        exchange: impl FnOnce(&mut Self) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        if self.poisoned {
            return Err(EngineError::Closed);
        }
        let result = exchange(self);
        if let Err(EngineError::Protocol(_) | EngineError::IoError(_)) = &result {
            self.poisoned = true;
        }
        result
    }

    /// Send one request and return the payload of an `ok` reply
    fn request(&mut self, verb: &str, payload: &str) -> Result<String, EngineError> {
        writeln!(self.writer, "{}\t{}", verb, payload)?;
        self.writer.flush()?;

        self.line.clear();
        if self.reader.read_line(&mut self.line)? == 0 {
            return Err(EngineError::Protocol(
                "bridge closed its output stream".to_string(),
            ));
        }
        parse_reply(&self.line).map(str::to_string)
    }

    /// Tell the peer to shut down
    fn quit(&mut self) -> Result<(), EngineError> {
        writeln!(self.writer, "quit")?;
        self.writer.flush()?;
        Ok(())
    }
}

impl<R: BufRead, W: Write> ChemistryEngine for LineProtocol<R, W> {
    type Molecule = BridgeMolecule;

    fn parse(&mut self, descriptor: &str) -> Result<Self::Molecule, EngineError> {
        if descriptor.contains(['\n', '\r', '\t']) {
            return Err(EngineError::Rejected(
                "descriptor contains line or field separators".to_string(),
            ));
        }
        self.guarded(|protocol| {
            let handle = protocol.request("parse", descriptor)?;
            if handle.is_empty() || handle.contains(char::is_whitespace) {
                return Err(EngineError::Protocol(format!(
                    "invalid molecule handle {:?}",
                    handle
                )));
            }
            Ok(BridgeMolecule(handle))
        })
    }

    fn fingerprint(&mut self, molecule: &Self::Molecule) -> Result<Vec<u32>, EngineError> {
        self.guarded(|protocol| {
            let payload = protocol.request("fingerprint", molecule.as_str())?;
            parse_set_bits(&payload)
        })
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.quit()
    }
}

/// Interpret one reply line, returning the payload of an `ok` reply
pub fn parse_reply(line: &str) -> Result<&str, EngineError> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (status, payload) = match line.split_once('\t') {
        Some((status, payload)) => (status, payload),
        None => (line, ""),
    };

    match status {
        "ok" => Ok(payload),
        "err" => Err(EngineError::Rejected(if payload.is_empty() {
            "no reason given".to_string()
        } else {
            payload.to_string()
        })),
        _ => Err(EngineError::Protocol(format!(
            "unexpected reply: {:?}",
            line
        ))),
    }
}

/// Parse a whitespace-separated list of set-bit indices
pub fn parse_set_bits(payload: &str) -> Result<Vec<u32>, EngineError> {
    payload
        .split_ascii_whitespace()
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| EngineError::Protocol(format!("invalid bit index {:?}", token)))
        })
        .collect()
}

/// Chemistry engine running in a child process
///
/// The child is launched by [`ProcessBridge::launch`] and stays alive for
/// the whole session. Call [`ChemistryEngine::close`] (usually through
/// `FingerprintAdapter::close`) to shut it down cleanly; a bridge dropped
/// while still open kills its child.
#[derive(Debug)]
pub struct ProcessBridge {
    child: Child,
    protocol: Option<LineProtocol<BufReader<ChildStdout>, ChildStdin>>,
}

impl ProcessBridge {
    /// Launch the helper process described by `config`
    pub fn launch(config: &BridgeConfig) -> Result<Self, EngineError> {
        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(dir) = &config.working_dir {
            command.current_dir(dir);
        }

        let mut child = command.spawn()?;
        let (stdin, stdout) = match (child.stdin.take(), child.stdout.take()) {
            (Some(stdin), Some(stdout)) => (stdin, stdout),
            _ => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(EngineError::Protocol(
                    "bridge process has no piped stdio".to_string(),
                ));
            }
        };

        info!(
            "Launched chemistry bridge {:?} (pid {})",
            config.command,
            child.id()
        );

        Ok(Self {
            child,
            protocol: Some(LineProtocol::new(BufReader::new(stdout), stdin)),
        })
    }

    /// Process id of the helper
    pub fn id(&self) -> u32 {
        self.child.id()
    }

    fn protocol(&mut self) -> Result<&mut LineProtocol<BufReader<ChildStdout>, ChildStdin>, EngineError> {
        self.protocol.as_mut().ok_or(EngineError::Closed)
    }
}

impl ChemistryEngine for ProcessBridge {
    type Molecule = BridgeMolecule;

    fn parse(&mut self, descriptor: &str) -> Result<Self::Molecule, EngineError> {
        self.protocol()?.parse(descriptor)
    }

    fn fingerprint(&mut self, molecule: &Self::Molecule) -> Result<Vec<u32>, EngineError> {
        self.protocol()?.fingerprint(molecule)
    }

    fn close(&mut self) -> Result<(), EngineError> {
        let Some(mut protocol) = self.protocol.take() else {
            return Ok(());
        };
        let poisoned = protocol.is_poisoned();
        if poisoned {
            // Out of step with the helper; `quit` may never be read
            warn!("Chemistry bridge session failed, terminating pid {}", self.child.id());
            drop(protocol);
            let _ = self.child.kill();
        } else {
            if let Err(e) = protocol.quit() {
                debug!("Bridge did not accept quit: {}", e);
            }
            // Dropping stdin signals EOF to helpers that ignore `quit`.
            drop(protocol);
        }

        let status = self.child.wait()?;
        if poisoned {
            debug!("Chemistry bridge reaped with {}", status);
        } else if status.success() {
            debug!("Chemistry bridge exited cleanly");
        } else {
            warn!("Chemistry bridge exited with {}", status);
        }
        Ok(())
    }
}

impl Drop for ProcessBridge {
    fn drop(&mut self) {
        if self.protocol.take().is_some() {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
