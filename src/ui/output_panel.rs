/// Right column: generated copy, loading state or error
use iced::widget::{button, column, container, row, scrollable, text, horizontal_space};
use iced::{Alignment, Element, Length};

use crate::Message;

pub fn view<'a>(description: &'a str, is_loading: bool, error: Option<&'a str>) -> Element<'a, Message> {
    let body: Element<'a, Message> = if is_loading {
        text("Crafting your description...")
            .size(16)
            .style(text::primary)
            .into()
    } else if let Some(error) = error {
        text(error).size(16).style(text::danger).into()
    } else if description.is_empty() {
        text("Your generated description will appear here.")
            .size(16)
            .style(text::secondary)
            .into()
    } else {
        scrollable(text(description).size(16))
            .height(Length::Fill)
            .into()
    };

    // Copy only makes sense for a finished description
    let copy = button("Copy")
        .style(button::secondary)
        .padding(8)
        .on_press_maybe((!is_loading && !description.is_empty()).then_some(Message::CopyDescription));

    container(
        column![
            row![text("Generated Description").size(20), horizontal_space(), copy]
                .align_y(Alignment::Center),
            container(body)
                .padding(12)
                .width(Length::Fill)
                .height(Length::Fill)
                .style(container::bordered_box),
        ]
        .spacing(12),
    )
    .padding(20)
    .width(Length::Fill)
    .height(Length::Fill)
    .style(container::rounded_box)
    .into()
}
