pub fn scroll_to_bottom(e: &web_sys::Element) {
    // Do not try to compute the real scroll position, as it can be very slow.
    e.set_scroll_top(1_000_000_000);
}
