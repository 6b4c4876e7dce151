use core::panic::PanicInfo;

#[inline(never)]
#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    match info.location() {
        Some(loc) => {
            defmt::error!("panic at {=str}:{=u32}", loc.file(), loc.line());
        }
        None => {
            defmt::error!("panic without location information, halting");
        }
    }

    loop {
        continue;
    }
}
