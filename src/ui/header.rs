/// Title bar with the theme toggle
use iced::widget::{column, row, text, toggler, horizontal_space};
use iced::{Alignment, Element};

use crate::Message;

pub fn view<'a>(dark_mode: bool) -> Element<'a, Message> {
    row![
        column![
            text("Product Copy Studio").size(32),
            text("Turn a product photo and a few notes into ready-to-use marketing copy")
                .size(14)
                .style(text::secondary),
        ]
        .spacing(4),
        horizontal_space(),
        toggler(dark_mode)
            .label("Dark mode")
            .on_toggle(Message::DarkModeToggled),
    ]
    .align_y(Alignment::Center)
    .into()
}
