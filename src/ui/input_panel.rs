/// Left column: product image, feature notes and audience
use iced::widget::{button, column, container, image, row, text, text_editor, horizontal_space};
use iced::{Alignment, Element, Length};

use crate::Message;

/// Height of the image preview area
const PREVIEW_HEIGHT: f32 = 240.0;

pub fn view<'a>(
    preview: Option<&'a image::Handle>,
    image_name: Option<&'a str>,
    features: &'a text_editor::Content,
    audience: &'a text_editor::Content,
) -> Element<'a, Message> {
    let picture: Element<'a, Message> = match preview {
        Some(handle) => image(handle.clone())
            .width(Length::Fill)
            .height(Length::Fixed(PREVIEW_HEIGHT))
            .into(),
        None => container(
            text("Click \"Choose Image\" or drop a product photo here")
                .size(14)
                .style(text::secondary),
        )
        .width(Length::Fill)
        .height(Length::Fixed(PREVIEW_HEIGHT))
        .center_x(Length::Fill)
        .center_y(Length::Fixed(PREVIEW_HEIGHT))
        .style(container::bordered_box)
        .into(),
    };

    let picker = row![
        button("Choose Image")
            .on_press(Message::PickImage)
            .padding(8),
        text(image_name.unwrap_or("No image selected")).size(14),
        horizontal_space(),
        button("Clear")
            .on_press(Message::Clear)
            .style(button::secondary)
            .padding(8),
    ]
    .spacing(12)
    .align_y(Alignment::Center);

    let features_editor = text_editor(features)
        .placeholder("One feature per line, e.g. Material: 100% Organic Cotton")
        .on_action(Message::FeaturesEdited)
        .height(Length::Fixed(140.0));

    let audience_editor = text_editor(audience)
        .placeholder("Who is this product for?")
        .on_action(Message::AudienceEdited)
        .height(Length::Fixed(80.0));

    container(
        column![
            text("1. Product Image").size(20),
            picture,
            picker,
            text("2. Key Features").size(20),
            features_editor,
            text("3. Target Audience").size(20),
            audience_editor,
        ]
        .spacing(12),
    )
    .padding(20)
    .width(Length::Fill)
    .style(container::rounded_box)
    .into()
}
