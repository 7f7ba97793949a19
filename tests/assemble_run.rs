// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! End-to-end tests over the public API: assemble source, load the
//! image, clock the machine to halt, inspect the wreckage

use adr8::{asm::BOOTSTRAP_PATH, prelude::*};
use std::{
    cell::RefCell,
    io::{self, empty, Cursor},
    rc::Rc,
};

/// An output sink the test can still read after the machine boxes it
#[derive(Clone, Debug, Default)]
struct SharedOut(Rc<RefCell<Vec<u8>>>);

impl SharedOut {
    fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl io::Write for SharedOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn assemble(source: &str) -> Vec<u8> {
    let mut asm = Assembler::new();
    asm.pass(source, "test.asm").expect("source should assemble");
    asm.finish().expect("labels should resolve")
}

/// Clocks a bare core + RAM machine to halt and returns both
fn run_image(image: &[u8]) -> (Core, Ram) {
    let mut bus = Bus::new();
    let mut core = Core::new();
    let mut ram = Ram::new(0x0000, 0x1000);
    ram.load(0, image);
    let mut edges = 0;
    while !core.halted() {
        core.tick(&mut bus).expect("image should only contain valid opcodes");
        ram.tick(&mut bus);
        edges += 1;
        assert!(edges < 100_000, "program did not halt");
    }
    (core, ram)
}

#[test]
fn assembler_round_trip() {
    let image = assemble("SETA 0x0003\nSETB 0x0002\nADD\nHALT\n");
    assert_eq!(8, image.len());
    let (core, _) = run_image(&image);
    assert_eq!(5, core.a());
}

#[test]
fn sum_lands_in_memory() {
    let image = assemble("SETA 0x0011\nSETB 0x0022\nADD\nSTAL 0x0040\nHALT\n");
    let (core, ram) = run_image(&image);
    assert!(core.halted());
    assert_eq!(0x33, ram.peek(0x40));
}

#[test]
fn forward_references_run_like_backward_ones() {
    let image = assemble(
        "JMPA skip\nHALT\nskip:\nSETA 0x0001\nJMPA out\nHALT\nout:\nHALT\n",
    );
    let (core, _) = run_image(&image);
    assert_eq!(1, core.a());
}

#[test]
fn hello_world_demo_prints_over_serial() {
    let image = assemble(include_str!("../demos/hello_world.asm"));
    let out = SharedOut::default();

    let mut ram = Ram::new(0x0000, 0x1000);
    ram.load(0, &image);
    let mut machine = machine! {
        ram,
        Serial::new(0x1000, empty(), out.clone()),
    };
    machine.run(Some(100_000)).unwrap();

    assert!(machine.core.halted());
    assert_eq!(b"hello world!\n\0".to_vec(), out.bytes());
}

#[test]
fn incrementer_demo_counts_to_ten() {
    let image = assemble(include_str!("../demos/incrementer.asm"));
    let (core, ram) = run_image(&image);
    // the result cell sits right behind the jump over the data section
    assert_eq!(10, ram.peek(0x03));
    assert_eq!(10, core.a());
    // ten partial sums were pushed below the stack base
    assert_eq!(0x0fff - 10, core.stk());
}

#[test]
fn bootstrap_image_boots_over_serial() {
    // payload labels resolve to image offsets; the loader copies the
    // image over address zero, so offsets and addresses coincide
    let payload = "JMPA start\nstart:\nSETA 0x004F\nSTAL 0x1000\nSETA 0x004B\nSTAL 0x1000\nHALT\n";
    let mut asm = Assembler::new();
    asm.pass(include_str!("../demos/bootstrap.asm"), BOOTSTRAP_PATH)
        .unwrap();
    asm.pass(payload, "payload.asm").unwrap();
    let image = asm.finish().unwrap();

    let out = SharedOut::default();
    let mut ram = Ram::new(0x0000, 0x1000);
    ram.load(0, adr8::asm::BOOT_LOADER);
    let mut machine = machine! {
        ram,
        Serial::new(0x1000, Cursor::new(image), out.clone()),
    };
    machine.run(Some(100_000)).unwrap();

    assert!(machine.core.halted());
    assert_eq!(b"OK".to_vec(), out.bytes());
}

#[test]
fn machine_stops_at_the_edge_limit() {
    // zeroed RAM reads as an endless run of NOPs
    let mut machine = machine![Ram::new(0x0000, 0x100)];
    let edges = machine.run(Some(64)).unwrap();
    assert_eq!(64, edges);
    assert!(!machine.core.halted());
}

#[test]
fn fault_surfaces_through_the_machine() {
    let mut ram = Ram::new(0x0000, 0x100);
    ram.load(0, &[0x02]); // not an instruction
    let mut machine = machine![ram];
    machine.run(None).expect_err("0x02 is not an instruction");
    assert!(machine.core.halted());
}
