//! Vector table and reset handler for the LPC2138.
//!
//! The LPC2138 boots in ARM state, Supervisor mode, with IRQ and FIQ masked
//! and the vector table at address 0. `_reset` gives every exception mode a
//! small stack below `_stack_top`, initializes `.data` and `.bss`, and calls
//! `main` in Supervisor mode with interrupts still masked.
//!
//! Word 0x14 is the boot-loader signature slot: the sum of the eight vector
//! words must be zero for the on-chip boot loader to start user code.
//! `lpc21isp` patches it when flashing, so it is left as zero here.

core::arch::global_asm!(
    ".section .vectors, \"ax\"",
    ".arm",
    ".global _vectors",
    "_vectors:",
    "    ldr pc, .Lreset_addr",
    "    ldr pc, .Lundef_addr",
    "    ldr pc, .Lswi_addr",
    "    ldr pc, .Lprefetch_addr",
    "    ldr pc, .Ldata_abort_addr",
    "    .word 0",
    "    ldr pc, .Lirq_addr",
    "    ldr pc, .Lfiq_addr",
    ".Lreset_addr:      .word _reset",
    ".Lundef_addr:      .word UndefHandler",
    ".Lswi_addr:        .word SwiHandler",
    ".Lprefetch_addr:   .word PrefetchAbortHandler",
    ".Ldata_abort_addr: .word DataAbortHandler",
    ".Lirq_addr:        .word IrqHandler",
    ".Lfiq_addr:        .word FiqHandler",
);

core::arch::global_asm!(
    ".section .text._reset, \"ax\"",
    ".arm",
    ".global _reset",
    ".type _reset, %function",
    "_reset:",
    "    ldr   r0, =_stack_top",
    // UND, ABT, FIQ, IRQ: 64 bytes each, I and F set
    "    msr   cpsr_c, #0xDB",
    "    mov   sp, r0",
    "    sub   r0, r0, #64",
    "    msr   cpsr_c, #0xD7",
    "    mov   sp, r0",
    "    sub   r0, r0, #64",
    "    msr   cpsr_c, #0xD1",
    "    mov   sp, r0",
    "    sub   r0, r0, #64",
    "    msr   cpsr_c, #0xD2",
    "    mov   sp, r0",
    "    sub   r0, r0, #64",
    // SVC gets the rest
    "    msr   cpsr_c, #0xD3",
    "    mov   sp, r0",
    "    ldr   r0, =_sidata",
    "    ldr   r1, =_sdata",
    "    ldr   r2, =_edata",
    ".Lcopy_data:",
    "    cmp   r1, r2",
    "    ldrlo r3, [r0], #4",
    "    strlo r3, [r1], #4",
    "    blo   .Lcopy_data",
    "    ldr   r1, =_sbss",
    "    ldr   r2, =_ebss",
    "    mov   r3, #0",
    ".Lzero_bss:",
    "    cmp   r1, r2",
    "    strlo r3, [r1], #4",
    "    blo   .Lzero_bss",
    "    bl    main",
    ".Lhang:",
    "    b     .Lhang",
    ".ltorg",
    ".size _reset, . - _reset",
);
