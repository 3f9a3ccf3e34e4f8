use alloy_primitives::{Address, Bytes};
use safe_multisig::SignerOutput;

use std::io::Write;

/// What a command writes to stdout on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    /// ABI-encoded result, written as `0x`-prefixed hex.
    Hex(Bytes),
    Text(String),
    /// Written one entry per line, without a trailing newline.
    Lines(Vec<String>),
}

impl CommandOutput {
    /// `signature` and `signer`, one per line.
    pub fn signature(signature: &Bytes, signer: Address) -> Self {
        Self::Lines(vec![signature.to_string(), signer.to_checksum(None)])
    }

    /// Renders the output, or `None` when there is nothing to print.
    pub fn render(&self) -> Option<String> {
        let rendered = match self {
            CommandOutput::Hex(bytes) => bytes.to_string(),
            CommandOutput::Text(text) => text.clone(),
            CommandOutput::Lines(lines) => lines.join("\n"),
        };
        (!rendered.is_empty()).then_some(rendered)
    }

    pub fn write_to(&self, out: &mut impl Write) -> eyre::Result<()> {
        let rendered = self.render().ok_or_else(|| eyre::eyre!("No result for command"))?;
        out.write_all(rendered.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}

impl From<SignerOutput> for CommandOutput {
    fn from(output: SignerOutput) -> Self {
        Self::signature(&output.signature, output.address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, bytes};

    #[test]
    fn hex_is_written_raw() {
        let mut out = Vec::new();
        CommandOutput::Hex(bytes!("deadbeef")).write_to(&mut out).unwrap();
        assert_eq!(out, b"0xdeadbeef");
    }

    #[test]
    fn signatures_are_two_lines() {
        let output = CommandOutput::signature(
            &bytes!("aa1f"),
            address!("cafecafecafecafecafecafecafecafecafecafe"),
        );
        assert_eq!(
            output.render().unwrap(),
            "0xaa1f\n0xCAfEcAfeCAfECaFeCaFecaFecaFECafECafeCaFe"
        );
    }

    #[test]
    fn empty_results_are_errors() {
        let mut out = Vec::new();
        let err = CommandOutput::Text(String::new()).write_to(&mut out).unwrap_err();
        assert_eq!(err.to_string(), "No result for command");
        assert!(out.is_empty());
        assert!(CommandOutput::Lines(vec![]).render().is_none());
    }
}
