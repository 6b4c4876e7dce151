//! `critical-section` implementation for the single-core ARM7TDMI-S.
//!
//! There is no cortex-m style PRIMASK; interrupts are masked through the I
//! and F bits of CPSR. The previous CPSR control byte is the restore state,
//! so nested sections unmask only when the outermost one ends.

use core::arch::asm;

use critical_section::RawRestoreState;

struct Arm7CriticalSection;

critical_section::set_impl!(Arm7CriticalSection);

// SAFETY: single core; with I and F set no handler can run until release.
unsafe impl critical_section::Impl for Arm7CriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let cpsr: u32;
        // SAFETY: reads CPSR and sets I/F in the control field. Runs in a
        // privileged mode (the firmware never drops to User).
        unsafe {
            asm!(
                "mrs {prev}, cpsr",
                // I (bit 7) and F (bit 6)
                "orr {masked}, {prev}, #0xC0",
                "msr cpsr_c, {masked}",
                prev = out(reg) cpsr,
                masked = out(reg) _,
                options(nostack, preserves_flags),
            );
        }
        cpsr
    }

    unsafe fn release(restore: RawRestoreState) {
        // SAFETY: `restore` is the CPSR read by the matching `acquire`.
        unsafe {
            asm!(
                "msr cpsr_c, {prev}",
                prev = in(reg) restore,
                options(nostack, preserves_flags),
            );
        }
    }
}
