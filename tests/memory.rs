use fantasy_cpu::{assemble, Bus, Cpu, CpuConfig, Flags, Instr, MemoryError, Src, Trap};

fn small_cpu(size: usize) -> Cpu {
    Cpu::new(CpuConfig { memory_size: size, ..CpuConfig::default() })
}

fn load(cpu: &mut Cpu, prog: &[Instr]) {
    cpu.load_program(&assemble(prog).unwrap().words).unwrap();
}

#[test]
fn default_memory_is_16_mib() {
    let cpu: Cpu = Cpu::default();
    assert_eq!(cpu.mem().size(), 16 * 1024 * 1024);
    assert_eq!(cpu.read32(16 * 1024 * 1024 - 4).unwrap(), 0);
}

#[test]
fn store_then_read_back() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[
        Instr::Mov { rd: 0, src: Src::Imm(10) },
        Instr::Mov { rd: 1, src: Src::Imm(20) },
        Instr::Store { rs: 1, base: 0, offset: 0 },
    ]);
    for _ in 0..3 {
        cpu.run_cycle().unwrap();
    }
    assert_eq!(cpu.read32(10).unwrap(), 20);
}

#[test]
fn store_load_round_trip_with_offset() {
    let mut cpu = small_cpu(1024);
    load(&mut cpu, &[
        Instr::Store { rs: 2, base: 1, offset: 0x40 },
        Instr::Load { rd: 3, base: 1, offset: 0x40 },
    ]);
    cpu.regs[1] = 0x100;
    cpu.regs[2] = 0xCAFE_F00D;
    cpu.run_cycle().unwrap();
    assert_eq!(cpu.read32(0x140).unwrap(), 0xCAFE_F00D);
    cpu.run_cycle().unwrap();
    assert_eq!(cpu.regs[3], 0xCAFE_F00D);
    assert!(cpu.flags.contains(Flags::N));
}

#[test]
fn offset_is_the_low_byte_only() {
    let mut cpu = small_cpu(1024);
    load(&mut cpu, &[Instr::Load { rd: 0, base: 1, offset: 0xFF }]);
    cpu.regs[1] = 0x200;
    cpu.write32(0x2FF, 77).unwrap();
    cpu.run_cycle().unwrap();
    assert_eq!(cpu.regs[0], 77);
}

#[test]
fn load_sets_zero_flag() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[Instr::Load { rd: 0, base: 0, offset: 0x80 }]);
    cpu.regs[0] = 0x10;
    cpu.run_cycle().unwrap();
    assert_eq!(cpu.regs[0], 0);
    assert!(cpu.flags.contains(Flags::Z));
}

#[test]
fn store_leaves_flags_untouched() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[Instr::Store { rs: 0, base: 1, offset: 0x80 }]);
    cpu.flags = Flags::N | Flags::C;
    cpu.run_cycle().unwrap();
    assert_eq!(cpu.flags, Flags::N | Flags::C);
}

#[test]
fn unaligned_word_access_spans_bytes() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[
        Instr::Store { rs: 1, base: 0, offset: 0x81 },
        Instr::Load { rd: 2, base: 0, offset: 0x81 },
    ]);
    cpu.regs[1] = 0x4433_2211;
    cpu.run_cycle().unwrap();
    cpu.run_cycle().unwrap();
    assert_eq!(cpu.regs[2], 0x4433_2211);
    let mem = cpu.mem();
    assert_eq!(mem.read_u8(0x80).unwrap(), 0);
    assert_eq!(mem.read_u8(0x81).unwrap(), 0x11);
    assert_eq!(mem.read_u8(0x84).unwrap(), 0x44);
    assert_eq!(mem.read_u8(0x85).unwrap(), 0);
}

#[test]
fn load_past_end_is_fatal() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[Instr::Load { rd: 0, base: 1, offset: 0xFD }]);
    cpu.regs[1] = 0;
    cpu.regs[0] = 0x55;
    let trap = cpu.run_cycle().unwrap_err();
    assert_eq!(
        trap,
        Trap::Memory {
            pc: 0,
            source: MemoryError::OutOfBounds { addr: 0xFD, width: 4, size: 256 },
        }
    );
    assert_eq!(cpu.regs[0], 0x55);
}

#[test]
fn store_past_end_is_fatal_and_writes_nothing() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[
        Instr::Mov { rd: 7, src: Src::Imm(0xAA) },
        Instr::Store { rs: 7, base: 1, offset: 0 },
        Instr::Halt,
    ]);
    cpu.regs[1] = 254;
    let trap = cpu.run_until_halt().unwrap_err();
    assert!(matches!(
        trap,
        Trap::Memory { pc: 4, source: MemoryError::OutOfBounds { addr: 254, width: 4, .. } }
    ));
    assert_eq!(cpu.mem().read_u8(254).unwrap(), 0);
    assert_eq!(cpu.mem().read_u8(255).unwrap(), 0);
    assert!(!cpu.halted());
}

#[test]
fn effective_address_overflow_is_fatal() {
    let mut cpu = small_cpu(256);
    load(&mut cpu, &[Instr::Load { rd: 0, base: 1, offset: 8 }]);
    cpu.regs[1] = 0xFFFF_FFFC;
    let trap = cpu.run_cycle().unwrap_err();
    assert_eq!(trap, Trap::AddressOverflow { pc: 0, base: 0xFFFF_FFFC, offset: 8 });
}

#[test]
fn program_larger_than_memory_fails_to_load() {
    let mut cpu = small_cpu(8);
    let err = cpu.load_program(&[0, 0, 0]).unwrap_err();
    assert_eq!(err, MemoryError::OutOfBounds { addr: 8, width: 4, size: 8 });
}

#[test]
fn program_is_loaded_little_endian_from_zero() {
    let mut cpu = small_cpu(64);
    cpu.load_program(&[0x0102_0304, 0xA0B0_C0D0]).unwrap();
    assert_eq!(cpu.mem().read_u8(0).unwrap(), 0x04);
    assert_eq!(cpu.mem().read_u8(7).unwrap(), 0xA0);
    assert_eq!(cpu.read32(4).unwrap(), 0xA0B0_C0D0);
}
