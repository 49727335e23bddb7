use serde_json::json;
use teestudio::{
    ContainerSize, DesignDescriptor, DesignState, LogoItem, MockupVariant, Point, Rgba8, Side,
    SideDescriptor,
};

fn container() -> ContainerSize {
    ContainerSize::new(440.0, 440.0).unwrap()
}

fn variant() -> MockupVariant {
    serde_json::from_value(json!({
        "id": 7,
        "mockup_type": 1,
        "mockup_type_slug": "t-shirt",
        "size": "L",
        "color_name": "Black",
        "front_image": "/media/mockups/front/black.png",
        "back_image": "/media/mockups/back/black.png",
    }))
    .unwrap()
}

#[test]
fn descriptor_wire_shape_matches_the_backend_contract() {
    let mut design = DesignState::new();
    let front = design.side_mut(Side::Front);

    let mut logo = LogoItem::new("/media/designs/brand.png");
    logo.position = Point::new(110.0, 220.0);
    logo.set_scale(0.6);
    logo.set_rotation(15.0);
    front.add_logo(logo).unwrap();

    front.text.set_content("AB");
    front.text.set_char_color(0, Rgba8::from_hex("#FF0000").unwrap());
    front.text.position = Point::new(220.0, 330.0);

    let descriptor = DesignDescriptor::from_state(&design, &variant(), container());
    let value = serde_json::to_value(&descriptor).unwrap();

    assert_eq!(
        value,
        json!({
            "type": "logo_on_mockup",
            "mockupType": "t-shirt",
            "mockupVariantId": 7,
            "variant": {"size": "L", "color": "Black"},
            "sides": {
                "front": {
                    "hasLogo": true,
                    "hasText": true,
                    "logos": [
                        {"url": "/media/designs/brand.png",
                         "placement": {"x": 0.25, "y": 0.5, "scale": 0.6, "rotation": 15.0}}
                    ],
                    "textPlacement": {"x": 0.5, "y": 0.75, "scale": 0.6, "rotation": 0.0},
                    "text": "AB",
                    "textColor": "#000000",
                    "textFont": "sans-serif",
                    "charColors": ["#FF0000", "#000000"]
                },
                "back": {
                    "hasLogo": false,
                    "hasText": false,
                    "logos": []
                }
            }
        })
    );

    descriptor.validate().unwrap();
}

#[test]
fn short_char_colors_resynchronize_during_replay() {
    // A descriptor produced elsewhere may carry a charColors array shorter
    // than the text; replay pads it with the default before any drawing.
    let side: SideDescriptor = serde_json::from_value(json!({
        "hasLogo": false,
        "hasText": true,
        "text": "AB",
        "textColor": "#000000",
        "charColors": ["#FF0000"],
        "textPlacement": {"x": 0.5, "y": 0.5, "scale": 0.6, "rotation": 0.0}
    }))
    .unwrap();

    let state = side.to_side_state(container());
    assert_eq!(state.text.char_colors().len(), 2);
    assert_eq!(state.text.char_color_at(0), Rgba8::from_hex("#FF0000").unwrap());
    assert_eq!(state.text.char_color_at(1), Rgba8::from_hex("#000000").unwrap());
}

#[test]
fn replay_then_rebuild_round_trips_the_descriptor() {
    let mut design = DesignState::new();
    let back = design.side_mut(Side::Back);
    let mut logo = LogoItem::new("https://cdn.example/a.png");
    logo.position = Point::new(330.0, 110.0);
    logo.set_scale(1.2);
    logo.set_rotation(-90.0);
    back.add_logo(logo).unwrap();

    let v = variant();
    let first = DesignDescriptor::from_state(&design, &v, container());

    let mut replayed = DesignState::new();
    for side in Side::ALL {
        *replayed.side_mut(side) = first.side(side).to_side_state(container());
    }
    let second = DesignDescriptor::from_state(&replayed, &v, container());

    assert_eq!(
        serde_json::to_value(&first).unwrap(),
        serde_json::to_value(&second).unwrap()
    );
}

#[test]
fn oversized_logo_lists_are_truncated_on_replay() {
    let logos: Vec<_> = (0..5)
        .map(|i| {
            json!({"url": format!("/l{i}.png"),
                   "placement": {"x": 0.5, "y": 0.5, "scale": 0.6, "rotation": 0.0}})
        })
        .collect();
    let side: SideDescriptor = serde_json::from_value(json!({
        "hasLogo": true,
        "hasText": false,
        "logos": logos,
    }))
    .unwrap();

    let state = side.to_side_state(container());
    assert_eq!(state.logos().len(), 3);
    assert_eq!(state.logos()[2].url, "/l2.png");
}
