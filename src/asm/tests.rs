// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Unit tests for [super::Assembler]

use super::*;

fn assemble(source: &str) -> Vec<u8> {
    let mut asm = Assembler::new();
    asm.pass(source, "test.asm").expect("source should assemble");
    asm.finish().expect("labels should resolve")
}

fn assemble_err(source: &str) -> Error {
    let mut asm = Assembler::new();
    match asm.pass(source, "test.asm") {
        Err(err) => err,
        Ok(()) => asm.finish().expect_err("assembly should fail"),
    }
}

mod emit {
    use super::*;

    #[test]
    fn mnemonics_emit_their_opcode_byte() {
        assert_eq!(
            vec![0x0A, 0x03, 0x00, 0x0B, 0x02, 0x00, 0x30, 0x01],
            assemble("SETA 0x0003\nSETB 0x0002\nADD\nHALT\n")
        );
    }

    #[test]
    fn two_digit_hex_emits_one_byte() {
        assert_eq!(vec![0xFF], assemble("0xFF"));
    }

    #[test]
    fn four_digit_hex_emits_two_bytes_little_endian() {
        assert_eq!(vec![0xFF, 0x00], assemble("0x00FF"));
    }

    #[test]
    fn other_hex_widths_are_fatal() {
        for source in ["0xF", "0xFFF", "0xFFFFF"] {
            match assemble_err(source) {
                Error::AmbiguousHexWidth { line: 1, .. } => {}
                other => panic!("expected AmbiguousHexWidth, got {other:?}"),
            }
        }
    }

    #[test]
    fn decimal_emits_one_signed_byte() {
        assert_eq!(vec![3], assemble("3"));
        assert_eq!(vec![0xFF], assemble("-1"));
        assert_eq!(vec![0x80], assemble("-128"));
        // atoi-style: out-of-range values wrap instead of failing
        assert_eq!(vec![44], assemble("300"));
    }

    #[test]
    fn string_emits_bytes_and_a_nul() {
        assert_eq!(b"hi\0".to_vec(), assemble("\"hi\""));
        assert_eq!(b"a\nb\0".to_vec(), assemble("\"a\\nb\""));
    }

    #[test]
    fn comments_and_whitespace_emit_nothing() {
        assert_eq!(vec![0x00], assemble("/ just padding\n\t NOP / trailing\n"));
    }

    #[test]
    fn stray_characters_are_fatal() {
        match assemble_err("NOP @") {
            Error::InvalidToken { ref lexeme, .. } if lexeme == "@" => {}
            other => panic!("expected InvalidToken, got {other:?}"),
        }
    }
}

mod labels {
    use super::*;

    #[test]
    fn forward_and_backward_references_resolve_alike() {
        // one use before the definition, one after
        let image = assemble("JMPA target\ntarget:\nJMPA target\nHALT\n");
        assert_eq!(vec![0x44, 0x03, 0x00, 0x44, 0x03, 0x00, 0x01], image);
    }

    #[test]
    fn label_pins_the_current_offset() {
        let image = assemble("NOP\nNOP\nhere:\nJMPA here\n");
        assert_eq!(vec![0x00, 0x00, 0x44, 0x02, 0x00], image);
    }

    #[test]
    fn duplicate_definitions_resolve_to_the_last() {
        let image = assemble("JMPA spot\nspot:\nNOP\nspot:\nHALT\n");
        // spot is defined at 3 and again at 4; the later one wins
        assert_eq!(vec![0x44, 0x04, 0x00, 0x00, 0x01], image);
    }

    #[test]
    fn references_resolve_across_files() {
        let mut asm = Assembler::new();
        asm.pass("JMPA elsewhere\n", "a.asm").unwrap();
        asm.pass("elsewhere:\nHALT\n", "b.asm").unwrap();
        assert_eq!(vec![0x44, 0x03, 0x00, 0x01], asm.finish().unwrap());
    }

    #[test]
    fn unresolved_references_are_fatal() {
        match assemble_err("JMPA nowhere\n") {
            Error::UnresolvedLabel { ref name, line: 1, .. } if name == "nowhere" => {}
            other => panic!("expected UnresolvedLabel, got {other:?}"),
        }
    }

    #[test]
    fn labels_cannot_follow_relative_jumps() {
        // a label patches two bytes; a relative jump has room for one
        match assemble_err("spot:\nJMPR spot\n") {
            Error::RelativeLabelOperand { ref name, line: 2, .. } if name == "spot" => {}
            other => panic!("expected RelativeLabelOperand, got {other:?}"),
        }
    }

    #[test]
    fn relative_jumps_still_take_literal_operands() {
        assert_eq!(vec![0x40, 0x03], assemble("JMPR 3\n"));
        assert_eq!(vec![0x41, 0xFE], assemble("JEQR -2\n"));
    }

    #[test]
    fn unknown_mnemonics_become_references() {
        // case matters: lowercase seta is not the SETA mnemonic
        let image = assemble("seta:\nNOP\nJMPA seta\n");
        assert_eq!(vec![0x00, 0x44, 0x00, 0x00], image);
    }
}

mod bootstrap {
    use super::*;

    #[test]
    fn bootstrap_first_input_prefixes_the_length() {
        let mut asm = Assembler::new();
        asm.pass("NOP\nNOP\nHALT\n", BOOTSTRAP_PATH).unwrap();
        assert_eq!(vec![0x03, 0x00, 0x00, 0x00, 0x01], asm.finish().unwrap());
    }

    #[test]
    fn bootstrap_elsewhere_does_not_prefix() {
        let mut asm = Assembler::new();
        asm.pass("NOP\n", "first.asm").unwrap();
        asm.pass("HALT\n", BOOTSTRAP_PATH).unwrap();
        assert_eq!(vec![0x00, 0x01], asm.finish().unwrap());
    }

    #[test]
    fn boot_loader_matches_its_source() {
        let mut asm = Assembler::new();
        asm.pass(include_str!("../../demos/bootstrap.asm"), BOOTSTRAP_PATH)
            .unwrap();
        let image = asm.finish().unwrap();
        let (length, stub) = image.split_at(2);
        assert_eq!((BOOT_LOADER.len() as u16).to_le_bytes().as_slice(), length);
        assert_eq!(BOOT_LOADER, stub);
    }
}

mod diagnostics {
    use super::*;

    #[test]
    fn errors_name_file_and_line() {
        let mut asm = Assembler::new();
        let err = asm
            .pass("NOP\nNOP\n0xFFF\n", "prog.asm")
            .expect_err("ambiguous hex should fail");
        match err {
            Error::AmbiguousHexWidth { ref file, line, .. } => {
                assert_eq!("prog.asm", file);
                assert_eq!(3, line);
            }
            other => panic!("expected AmbiguousHexWidth, got {other:?}"),
        }
    }

    #[test]
    fn unknown_escape_names_the_character() {
        match assemble_err("\"\\q\"") {
            Error::UnknownEscape { escape: 'q', .. } => {}
            other => panic!("expected UnknownEscape, got {other:?}"),
        }
    }
}
