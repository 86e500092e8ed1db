// Z80 execution tracing with per-address hit counts
//
// The tracer is fed one event at a time, in emulation order, through
// `&mut self`. It is not meant to be shared between threads.

use std::io::{self, Write};

use crate::instruction::{FetchEvent, Instruction};

const ADDRESS_SPACE: usize = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "lowercase"))]
pub enum AccessKind {
    Read,
    Write,
}

/// Everything the emulator reports while tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(tag = "type", rename_all = "snake_case"))]
pub enum TraceEvent {
    Irq { next_addr: u16, bus: u8 },
    Nmi { next_addr: u16 },
    Fetch(FetchEvent),
    MemAccess { kind: AccessKind, addr: u16, value: u8 },
    MapperChanged,
}

/// Source of the mapper state text printed on bank switches.
pub trait MapperProbe {
    fn describe(&self) -> String;
}

/// Used when the embedding has no mapper to describe.
pub struct NoMapper;

impl MapperProbe for NoMapper {
    fn describe(&self) -> String {
        String::from("<no mapper>")
    }
}

impl<F: Fn() -> String> MapperProbe for F {
    fn describe(&self) -> String {
        self()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub inst: Instruction,
    pub count: u64,
}

/// Print toggles, all off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceOptions {
    pub print_insts: bool,
    pub print_ram_access: bool,
    pub print_mapper_changed: bool,
}

/// Records every instruction address the CPU fetches from.
///
/// Records are keyed by the 16-bit CPU address only. After a bank switch
/// the same address can hold a different instruction, and its counter keeps
/// accumulating under the first instruction recorded there.
pub struct Tracer {
    records: Box<[Option<ExecutionRecord>]>,
    recorded: usize,
    max_count: u64,
    last_addr: Option<u16>,
    options: TraceOptions,
    out: Box<dyn Write>,
}

impl Tracer {
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Tracer whose live printing goes to `out` instead of stdout.
    pub fn with_output(out: Box<dyn Write>) -> Self {
        Self {
            records: vec![None; ADDRESS_SPACE].into_boxed_slice(),
            recorded: 0,
            max_count: 0,
            last_addr: None,
            options: TraceOptions::default(),
            out,
        }
    }

    #[cfg(feature = "cli")]
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new().with_options(TraceOptions::from(&config.trace))
    }

    pub fn with_options(mut self, options: TraceOptions) -> Self {
        self.options = options;
        self
    }

    pub fn set_print_insts(&mut self, enabled: bool) {
        self.options.print_insts = enabled;
    }

    pub fn set_print_ram_access(&mut self, enabled: bool) {
        self.options.print_ram_access = enabled;
    }

    pub fn set_print_mapper_changed(&mut self, enabled: bool) {
        self.options.print_mapper_changed = enabled;
    }

    pub fn options(&self) -> TraceOptions {
        self.options
    }

    pub fn handle(&mut self, event: &TraceEvent, mapper: &dyn MapperProbe) {
        match event {
            TraceEvent::Irq { bus, .. } => {
                if self.options.print_insts {
                    self.emit(format_args!("IRQ 00{:02X}", bus));
                }
            }
            TraceEvent::Nmi { .. } => self.emit(format_args!("NMI")),
            TraceEvent::Fetch(fetch) => self.fetch(fetch),
            TraceEvent::MemAccess { kind, addr, value } => self.mem_access(*kind, *addr, *value),
            TraceEvent::MapperChanged => {
                if self.options.print_mapper_changed {
                    let state = mapper.describe();
                    self.emit(format_args!("{}", state));
                }
            }
        }
    }

    pub fn fetch(&mut self, event: &FetchEvent) {
        let inst = Instruction::decode(event);
        let addr = inst.addr;
        self.last_addr = Some(addr);
        let line = self.options.print_insts.then(|| inst.to_string());

        let slot = &mut self.records[addr as usize];
        if slot.is_none() {
            log::debug!("new record at {:04X}", addr);
            self.recorded += 1;
        }
        let record = slot.get_or_insert_with(|| ExecutionRecord { inst, count: 0 });
        record.count += 1;
        if record.count > self.max_count {
            self.max_count = record.count;
        }

        if let Some(line) = line {
            self.emit(format_args!("{}", line));
        }
    }

    pub fn mem_access(&mut self, kind: AccessKind, addr: u16, value: u8) {
        if !self.options.print_ram_access {
            return;
        }
        match kind {
            AccessKind::Read => self.emit(format_args!("RAM[{:04X}] -> {:02X}", addr, value)),
            AccessKind::Write => self.emit(format_args!("RAM[{:04X}]= {:02X}", addr, value)),
        }
    }

    fn emit(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line) {
            log::warn!("trace output failed: {}", e);
        }
    }

    pub fn record(&self, addr: u16) -> Option<&ExecutionRecord> {
        self.records[addr as usize].as_ref()
    }

    /// Populated records in ascending address order.
    pub fn records(&self) -> impl Iterator<Item = (u16, &ExecutionRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .filter_map(|(addr, r)| r.as_ref().map(|r| (addr as u16, r)))
    }

    /// Number of distinct addresses recorded.
    pub fn len(&self) -> usize {
        self.recorded
    }

    pub fn is_empty(&self) -> bool {
        self.recorded == 0
    }

    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    pub fn last_addr(&self) -> Option<u16> {
        self.last_addr
    }

    /// Write the hit-count listing.
    ///
    /// Addresses covered by a listed instruction's operand bytes are not
    /// visited. A blank separator precedes every populated run that follows
    /// an unpopulated one.
    pub fn dump(&self, out: &mut impl Write) -> io::Result<()> {
        let width = decimal_digits(self.max_count);
        let mut prev = true;
        let mut addr = 0usize;
        while addr < ADDRESS_SPACE {
            match &self.records[addr] {
                None => {
                    prev = false;
                    addr += 1;
                }
                Some(record) => {
                    if !prev {
                        writeln!(out, "\n")?;
                    }
                    writeln!(out, "[{:>width$}] {}", record.count, record.inst, width = width)?;
                    prev = true;
                    addr += record.inst.len();
                }
            }
        }
        out.flush()
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::new()
    }
}

fn decimal_digits(mut n: u64) -> usize {
    let mut digits = 0;
    while n != 0 {
        digits += 1;
        n /= 10;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operand::OperandExtra;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.borrow().clone()).unwrap()
        }
    }

    fn nop(next_addr: u16) -> TraceEvent {
        TraceEvent::Fetch(FetchEvent {
            next_addr,
            mnemonic_id: 29,
            op1_kind: 0,
            op2_kind: 0,
            bytes: vec![0x00],
            op1_extra: OperandExtra::default(),
            op2_extra: OperandExtra::default(),
        })
    }

    fn jp(next_addr: u16, target: u16) -> TraceEvent {
        TraceEvent::Fetch(FetchEvent {
            next_addr,
            mnemonic_id: 52,
            op1_kind: 40,
            op2_kind: 0,
            bytes: vec![0xC3, target as u8, (target >> 8) as u8],
            op1_extra: OperandExtra {
                addr_word: target,
                ..Default::default()
            },
            op2_extra: OperandExtra::default(),
        })
    }

    fn quiet() -> (Tracer, SharedBuf) {
        let buf = SharedBuf::default();
        (Tracer::with_output(Box::new(buf.clone())), buf)
    }

    #[test]
    fn repeated_fetch_counts_once_per_hit() {
        let (mut t, _) = quiet();
        t.handle(&nop(0x0101), &NoMapper);
        t.handle(&nop(0x0101), &NoMapper);
        assert_eq!(t.len(), 1);
        assert_eq!(t.record(0x0100).map(|r| r.count), Some(2));
        assert_eq!(t.max_count(), 2);
        assert_eq!(t.last_addr(), Some(0x0100));
    }

    #[test]
    fn interrupts_do_not_touch_records() {
        let (mut t, buf) = quiet();
        t.handle(&TraceEvent::Irq { next_addr: 0x0038, bus: 0xFF }, &NoMapper);
        t.handle(&TraceEvent::Nmi { next_addr: 0x0066 }, &NoMapper);
        assert!(t.is_empty());
        assert_eq!(t.last_addr(), None);
        // NMI is always printed, IRQ only with instruction printing on.
        assert_eq!(buf.text(), "NMI\n");

        t.set_print_insts(true);
        t.handle(&TraceEvent::Irq { next_addr: 0x0038, bus: 0xFF }, &NoMapper);
        assert_eq!(buf.text(), "NMI\nIRQ 00FF\n");
    }

    #[test]
    fn memory_access_lines() {
        let (mut t, buf) = quiet();
        let read = TraceEvent::MemAccess { kind: AccessKind::Read, addr: 0xC000, value: 0x12 };
        t.handle(&read, &NoMapper);
        assert_eq!(buf.text(), "");

        t.set_print_ram_access(true);
        t.handle(&read, &NoMapper);
        t.handle(
            &TraceEvent::MemAccess { kind: AccessKind::Write, addr: 0xC001, value: 0x0A },
            &NoMapper,
        );
        assert_eq!(buf.text(), "RAM[C000] -> 12\nRAM[C001]= 0A\n");
        assert!(t.is_empty());
    }

    #[test]
    fn mapper_change_delegates_to_probe() {
        let (mut t, buf) = quiet();
        let probe = || String::from("slot2=bank 5");
        t.handle(&TraceEvent::MapperChanged, &probe);
        assert_eq!(buf.text(), "");
        t.set_print_mapper_changed(true);
        t.handle(&TraceEvent::MapperChanged, &probe);
        assert_eq!(buf.text(), "slot2=bank 5\n");
    }

    #[test]
    fn printed_instructions_match_listing() {
        let (mut t, buf) = quiet();
        t.set_print_insts(true);
        t.handle(&nop(0x0001), &NoMapper);
        assert_eq!(buf.text(), "0000    00             NOP \n");
    }

    #[test]
    fn dump_skips_operand_bytes_and_separates_runs() {
        let (mut t, _) = quiet();
        // JP at 0000 covers 0000..0003; a stray record at 0001 is hidden.
        t.handle(&jp(0x0003, 0x0010), &NoMapper);
        t.handle(&nop(0x0002), &NoMapper);
        t.handle(&nop(0x0004), &NoMapper);
        for _ in 0..10 {
            t.handle(&nop(0x0011), &NoMapper);
        }

        let mut out = Vec::new();
        t.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "[ 1] 0000    c3 10 00       JP   0010H\n\
             [ 1] 0003    00             NOP \n\
             \n\n\
             [10] 0010    00             NOP \n"
        );
    }

    #[test]
    fn dump_of_empty_tracer_is_empty() {
        let (t, _) = quiet();
        let mut out = Vec::new();
        t.dump(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn records_iterate_in_address_order() {
        let (mut t, _) = quiet();
        t.handle(&nop(0x8001), &NoMapper);
        t.handle(&nop(0x0011), &NoMapper);
        t.handle(&nop(0xFFFF), &NoMapper);
        let addrs: Vec<u16> = t.records().map(|(a, _)| a).collect();
        assert_eq!(addrs, vec![0x0010, 0x8000, 0xFFFE]);
    }
}
