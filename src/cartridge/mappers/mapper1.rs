// Mapper 1 (SxROM / MMC1) - Serially loaded bank registers
//
// Memory Layout:
// - CPU $6000-$7FFF: 8KB PRG-RAM (disabled by PRG register bit 4)
// - CPU $8000-$BFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - CPU $C000-$FFFF: 16KB PRG-ROM bank (switchable or fixed depending on mode)
// - PPU $0000-$0FFF: 4KB CHR bank 0
// - PPU $1000-$1FFF: 4KB CHR bank 1
//
// Register Interface:
// Every write to $8000-$FFFF feeds the 5-bit load register:
// - Bit 7 set: clear the load register and OR $0C into control (PRG mode 3)
// - Otherwise bit 0 is shifted in from the top; the fifth write commits the
//   value to the register selected by address bits 13-14 of that fifth write
//
// Control ($8000-$9FFF):
//   Bits 0-1: Mirroring (0=one-screen lower, 1=one-screen upper, 2=vertical, 3=horizontal)
//   Bits 2-3: PRG mode (0/1=32KB, 2=fix first bank at $8000, 3=fix last bank at $C000)
//   Bit 4:    CHR mode (0=8KB, 1=two 4KB banks)
//
// CHR bank 0 ($A000-$BFFF), CHR bank 1 ($C000-$DFFF): 4KB bank numbers
// PRG bank ($E000-$FFFF): bits 0-3 bank number, bit 4 PRG-RAM disable

use super::{chr_memory, restore_ram, MapperState, PRG_RAM_SIZE};
use crate::cartridge::{Cartridge, Mapper, Mirroring};

const PRG_BANK_SIZE: usize = 16 * 1024;
const CHR_BANK_SIZE: usize = 4 * 1024;

/// Control register value at power-on: PRG mode 3, 8KB CHR, one-screen lower
const CONTROL_POWER_ON: u8 = 0x0C;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrgBankMode {
    /// 32KB at $8000, low bank bit ignored
    Switch32KB,
    /// First bank fixed at $8000, switchable 16KB at $C000
    FixFirst,
    /// Switchable 16KB at $8000, last bank fixed at $C000
    FixLast,
}

impl From<u8> for PrgBankMode {
    fn from(value: u8) -> Self {
        match value & 0b11 {
            0 | 1 => PrgBankMode::Switch32KB,
            2 => PrgBankMode::FixFirst,
            3 => PrgBankMode::FixLast,
            _ => unreachable!(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChrBankMode {
    Switch8KB,
    Switch4KB,
}

impl From<u8> for ChrBankMode {
    fn from(value: u8) -> Self {
        if value & 1 == 0 {
            ChrBankMode::Switch8KB
        } else {
            ChrBankMode::Switch4KB
        }
    }
}

/// MMC1 board
pub struct Mapper1 {
    prg_rom: Vec<u8>,
    prg_ram: Vec<u8>,
    chr_mem: Vec<u8>,
    chr_is_ram: bool,

    /// Load register; bits arrive at bit 4 and move down
    shift_register: u8,
    /// Serial writes accumulated so far (0-4)
    write_count: u8,

    control: u8,
    chr_bank_0: u8,
    chr_bank_1: u8,
    prg_bank: u8,

    prg_banks: usize,
    chr_banks: usize,
}

impl Mapper1 {
    pub fn new(mut cartridge: Cartridge) -> Self {
        let (chr_mem, chr_is_ram) = chr_memory(&mut cartridge);
        let prg_banks = (cartridge.prg_rom.len() / PRG_BANK_SIZE).max(1);
        let chr_banks = (chr_mem.len() / CHR_BANK_SIZE).max(1);

        Mapper1 {
            prg_rom: cartridge.prg_rom,
            prg_ram: vec![0; PRG_RAM_SIZE],
            chr_mem,
            chr_is_ram,
            shift_register: 0,
            write_count: 0,
            control: CONTROL_POWER_ON,
            chr_bank_0: 0,
            chr_bank_1: 0,
            prg_bank: 0,
            prg_banks,
            chr_banks,
        }
    }

    fn reset_shift_register(&mut self) {
        self.shift_register = 0;
        self.write_count = 0;
        self.control |= 0x0C;
    }

    /// Shift in bit 0 of `value`; returns the 5-bit result on the fifth write
    fn write_shift_register(&mut self, value: u8) -> Option<u8> {
        self.shift_register = (self.shift_register >> 1) | ((value & 1) << 4);
        self.write_count += 1;

        if self.write_count < 5 {
            return None;
        }

        let committed = self.shift_register;
        self.shift_register = 0;
        self.write_count = 0;
        Some(committed)
    }

    fn write_internal_register(&mut self, address: u16, value: u8) {
        match address {
            0x8000..=0x9FFF => self.control = value,
            0xA000..=0xBFFF => self.chr_bank_0 = value,
            0xC000..=0xDFFF => self.chr_bank_1 = value,
            0xE000..=0xFFFF => self.prg_bank = value,
            _ => unreachable!("MMC1 register write outside $8000-$FFFF"),
        }
        tracing::trace!(
            address = format_args!("{:04X}", address),
            value = format_args!("{:05b}", value),
            "MMC1 register commit"
        );
    }

    fn prg_bank_mode(&self) -> PrgBankMode {
        PrgBankMode::from(self.control >> 2)
    }

    fn chr_bank_mode(&self) -> ChrBankMode {
        ChrBankMode::from(self.control >> 4)
    }

    fn prg_ram_enabled(&self) -> bool {
        self.prg_bank & 0x10 == 0
    }

    fn map_prg_address(&self, address: u16) -> usize {
        let bank = (self.prg_bank & 0x0F) as usize;
        let last_bank = self.prg_banks - 1;
        let offset = (address & 0x3FFF) as usize;

        let bank_num = match (self.prg_bank_mode(), address) {
            (PrgBankMode::Switch32KB, 0x8000..=0xBFFF) => bank & !1,
            (PrgBankMode::Switch32KB, _) => bank | 1,
            (PrgBankMode::FixFirst, 0x8000..=0xBFFF) => 0,
            (PrgBankMode::FixFirst, _) => bank,
            (PrgBankMode::FixLast, 0x8000..=0xBFFF) => bank,
            (PrgBankMode::FixLast, _) => last_bank,
        };

        (bank_num % self.prg_banks) * PRG_BANK_SIZE + offset
    }

    fn map_chr_address(&self, address: u16) -> usize {
        let address = (address & 0x1FFF) as usize;
        let bank = match self.chr_bank_mode() {
            ChrBankMode::Switch8KB => (self.chr_bank_0 & !1) as usize + address / CHR_BANK_SIZE,
            ChrBankMode::Switch4KB if address < CHR_BANK_SIZE => self.chr_bank_0 as usize,
            ChrBankMode::Switch4KB => self.chr_bank_1 as usize,
        };

        (bank % self.chr_banks) * CHR_BANK_SIZE + address % CHR_BANK_SIZE
    }
}

impl Mapper for Mapper1 {
    fn mapper_number(&self) -> u8 {
        1
    }

    fn cpu_read(&self, address: u16) -> u8 {
        match address {
            0x6000..=0x7FFF if self.prg_ram_enabled() => {
                self.prg_ram[(address - 0x6000) as usize]
            }
            0x8000..=0xFFFF => self.prg_rom[self.map_prg_address(address)],
            _ => 0,
        }
    }

    fn cpu_write(&mut self, address: u16, value: u8) {
        match address {
            0x6000..=0x7FFF => {
                if self.prg_ram_enabled() {
                    self.prg_ram[(address - 0x6000) as usize] = value;
                }
            }
            0x8000..=0xFFFF => {
                if value & 0x80 != 0 {
                    self.reset_shift_register();
                } else if let Some(committed) = self.write_shift_register(value) {
                    self.write_internal_register(address, committed);
                }
            }
            _ => {}
        }
    }

    fn chr_read(&self, address: u16) -> u8 {
        self.chr_mem[self.map_chr_address(address)]
    }

    fn chr_write(&mut self, address: u16, value: u8) {
        if self.chr_is_ram {
            let index = self.map_chr_address(address);
            self.chr_mem[index] = value;
        }
    }

    fn mirroring_mode(&self) -> Mirroring {
        match self.control & 0b11 {
            0 => Mirroring::SingleScreenLower,
            1 => Mirroring::SingleScreenUpper,
            2 => Mirroring::Vertical,
            3 => Mirroring::Horizontal,
            _ => unreachable!(),
        }
    }

    fn rom_sizes(&self) -> (usize, usize) {
        (self.prg_rom.len(), if self.chr_is_ram { 0 } else { self.chr_mem.len() })
    }

    fn save_state(&self) -> MapperState {
        MapperState::Sxrom {
            shift_register: self.shift_register,
            write_count: self.write_count,
            control: self.control,
            chr_bank_0: self.chr_bank_0,
            chr_bank_1: self.chr_bank_1,
            prg_bank: self.prg_bank,
            prg_ram: self.prg_ram.clone(),
            chr_ram: if self.chr_is_ram {
                self.chr_mem.clone()
            } else {
                Vec::new()
            },
        }
    }

    fn load_state(&mut self, state: &MapperState) -> bool {
        let MapperState::Sxrom {
            shift_register,
            write_count,
            control,
            chr_bank_0,
            chr_bank_1,
            prg_bank,
            prg_ram,
            chr_ram,
        } = state
        else {
            return false;
        };
        if *write_count > 4 || (self.chr_is_ram && chr_ram.len() != self.chr_mem.len()) {
            return false;
        }
        if !restore_ram(&mut self.prg_ram, prg_ram) {
            return false;
        }
        if self.chr_is_ram {
            self.chr_mem.copy_from_slice(chr_ram);
        }
        self.shift_register = *shift_register & 0x1F;
        self.write_count = *write_count;
        self.control = *control & 0x1F;
        self.chr_bank_0 = *chr_bank_0 & 0x1F;
        self.chr_bank_1 = *chr_bank_1 & 0x1F;
        self.prg_bank = *prg_bank & 0x1F;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartridge::mappers::test_support::banked_cartridge;

    /// Load a 5-bit value into the register at `address` with five serial writes
    fn serial_write(mapper: &mut Mapper1, address: u16, value: u8) {
        for bit in 0..5 {
            mapper.cpu_write(address, (value >> bit) & 1);
        }
    }

    #[test]
    fn test_power_on_fixes_last_bank() {
        let mapper = Mapper1::new(banked_cartridge(1, 8, 2));
        assert_eq!(mapper.cpu_read(0x8000), 0);
        assert_eq!(mapper.cpu_read(0xC000), 7, "last bank fixed at $C000");
        assert_eq!(mapper.mirroring_mode(), Mirroring::SingleScreenLower);
    }

    #[test]
    fn test_fifth_write_commits_exactly_once() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 8, 2));

        for bit in 0..4 {
            mapper.cpu_write(0xE000, (0b00011 >> bit) & 1);
            assert_eq!(mapper.prg_bank, 0, "no commit before the fifth write");
        }
        mapper.cpu_write(0xE000, 0);
        assert_eq!(mapper.prg_bank, 0b00011);
        assert_eq!(mapper.write_count, 0);
        assert_eq!(mapper.cpu_read(0x8000), 3);
    }

    #[test]
    fn test_fifth_write_address_selects_register() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 8, 2));
        // First four writes go to $E000, the fifth lands on $A000
        for _ in 0..4 {
            mapper.cpu_write(0xE000, 1);
        }
        mapper.cpu_write(0xA000, 0);
        assert_eq!(mapper.chr_bank_0, 0b01111);
        assert_eq!(mapper.prg_bank, 0);
    }

    #[test]
    fn test_reset_bit_discards_partial_value() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 8, 2));
        serial_write(&mut mapper, 0x8000, 0b00010); // vertical, 32KB mode

        mapper.cpu_write(0xE000, 1);
        mapper.cpu_write(0xE000, 1);
        mapper.cpu_write(0xE000, 0x80);
        assert_eq!(mapper.write_count, 0);
        assert_eq!(mapper.shift_register, 0);
        assert_eq!(mapper.prg_bank, 0, "reset must not commit");
        assert_eq!(mapper.prg_bank_mode(), PrgBankMode::FixLast);
        assert_eq!(mapper.mirroring_mode(), Mirroring::Vertical);

        // The counter restarts: five more writes are needed
        serial_write(&mut mapper, 0xE000, 0b00101);
        assert_eq!(mapper.prg_bank, 0b00101);
    }

    #[test]
    fn test_mirroring_control() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 2, 1));
        let expected = [
            Mirroring::SingleScreenLower,
            Mirroring::SingleScreenUpper,
            Mirroring::Vertical,
            Mirroring::Horizontal,
        ];
        for (bits, mirroring) in expected.into_iter().enumerate() {
            serial_write(&mut mapper, 0x8000, 0x0C | bits as u8);
            assert_eq!(mapper.mirroring_mode(), mirroring);
        }
    }

    #[test]
    fn test_prg_32kb_mode_ignores_low_bit() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 8, 2));
        serial_write(&mut mapper, 0x8000, 0b00000);
        serial_write(&mut mapper, 0xE000, 0b00101);

        assert_eq!(mapper.cpu_read(0x8000), 4);
        assert_eq!(mapper.cpu_read(0xC000), 5);
    }

    #[test]
    fn test_prg_fix_first_mode() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 8, 2));
        serial_write(&mut mapper, 0x8000, 0b01000);
        serial_write(&mut mapper, 0xE000, 6);

        assert_eq!(mapper.cpu_read(0x8000), 0);
        assert_eq!(mapper.cpu_read(0xC000), 6);
    }

    #[test]
    fn test_chr_modes() {
        // 4 x 8KB CHR = eight 4KB banks numbered 0-7
        let mut mapper = Mapper1::new(banked_cartridge(1, 2, 4));

        serial_write(&mut mapper, 0x8000, 0b10000 | 0x0C);
        serial_write(&mut mapper, 0xA000, 5);
        serial_write(&mut mapper, 0xC000, 2);
        assert_eq!(mapper.chr_read(0x0000), 5);
        assert_eq!(mapper.chr_read(0x1000), 2);

        serial_write(&mut mapper, 0x8000, 0x0C);
        assert_eq!(mapper.chr_read(0x0000), 4, "8KB mode ignores bit 0");
        assert_eq!(mapper.chr_read(0x1000), 5);
    }

    #[test]
    fn test_prg_ram_disable_bit() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 2, 1));
        mapper.cpu_write(0x6000, 0x42);
        assert_eq!(mapper.cpu_read(0x6000), 0x42);

        serial_write(&mut mapper, 0xE000, 0x10);
        assert_eq!(mapper.cpu_read(0x6000), 0);
        mapper.cpu_write(0x6000, 0x99);

        serial_write(&mut mapper, 0xE000, 0x00);
        assert_eq!(mapper.cpu_read(0x6000), 0x42);
    }

    #[test]
    fn test_chr_ram_banking() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 2, 0));
        serial_write(&mut mapper, 0x8000, 0b10000 | 0x0C);
        serial_write(&mut mapper, 0xA000, 1);
        mapper.chr_write(0x0010, 0xAB);

        serial_write(&mut mapper, 0xA000, 0);
        assert_eq!(mapper.chr_read(0x1010), 0, "bank 1 still at $1000 defaults to bank 0");
        serial_write(&mut mapper, 0xC000, 1);
        assert_eq!(mapper.chr_read(0x1010), 0xAB);
    }

    #[test]
    fn test_state_restores_partial_shift() {
        let mut mapper = Mapper1::new(banked_cartridge(1, 8, 2));
        mapper.cpu_write(0xE000, 1);
        mapper.cpu_write(0xE000, 1);
        let state = mapper.save_state();

        let mut restored = Mapper1::new(banked_cartridge(1, 8, 2));
        assert!(restored.load_state(&state));
        restored.cpu_write(0xE000, 0);
        restored.cpu_write(0xE000, 0);
        restored.cpu_write(0xE000, 0);
        assert_eq!(restored.prg_bank, 0b00011);
    }
}
