//! Component Registry
//!
//! Static catalog of the visual component kinds the editor knows about.
//! Loaded once on first use and never mutated. Both the parser and the
//! generator consult it: the parser to decide which prop receives inner
//! text, the generator to order attributes, drop default values and pick
//! self-closing vs. nested output.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Props that may carry a node's inner text, in priority order.
pub const TEXT_CONTENT_PROPS: [&str; 5] = ["content", "text", "message", "title", "label"];

// ═══════════════════════════════════════════════════════════════════════════════
// DEFINITION TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentCategory {
    Layout,
    Typography,
    Button,
    Form,
    Feedback,
    Navigation,
    #[serde(rename = "Data Display")]
    DataDisplay,
    Media,
    Overlay,
    #[serde(rename = "E-commerce")]
    ECommerce,
    Social,
    Marketing,
    Utility,
}

impl ComponentCategory {
    /// Palette order.
    pub fn all() -> &'static [ComponentCategory] {
        use ComponentCategory::*;
        &[
            Layout,
            Typography,
            Button,
            Form,
            Feedback,
            Navigation,
            DataDisplay,
            Media,
            Overlay,
            ECommerce,
            Social,
            Marketing,
            Utility,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComponentCategory::Layout => "Layout",
            ComponentCategory::Typography => "Typography",
            ComponentCategory::Button => "Button",
            ComponentCategory::Form => "Form",
            ComponentCategory::Feedback => "Feedback",
            ComponentCategory::Navigation => "Navigation",
            ComponentCategory::DataDisplay => "Data Display",
            ComponentCategory::Media => "Media",
            ComponentCategory::Overlay => "Overlay",
            ComponentCategory::ECommerce => "E-commerce",
            ComponentCategory::Social => "Social",
            ComponentCategory::Marketing => "Marketing",
            ComponentCategory::Utility => "Utility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropType {
    String,
    Number,
    Boolean,
    Select,
    Color,
    Expression,
    Array,
    Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: PropType,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl PropDefinition {
    fn new(name: &str, prop_type: PropType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            prop_type,
            required: false,
            default_value: None,
            description: description.to_string(),
            options: None,
            placeholder: None,
        }
    }

    fn required(mut self) -> Self {
        self.required = true;
        self
    }

    fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    fn options(mut self, options: &[&str]) -> Self {
        self.options = Some(options.iter().map(|o| o.to_string()).collect());
        self
    }

    fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    pub name: String,
    pub description: String,
    /// e.g. `target.value`, `key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_object_props: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDefinition {
    pub name: String,
    pub category: ComponentCategory,
    pub description: String,
    /// Icon name understood by the palette.
    pub icon: String,
    pub props: Vec<PropDefinition>,
    pub events: Vec<EventDefinition>,
    pub accepts_children: bool,
}

impl ComponentDefinition {
    pub fn prop(&self, name: &str) -> Option<&PropDefinition> {
        self.props.iter().find(|p| p.name == name)
    }

    pub fn declares_prop(&self, name: &str) -> bool {
        self.prop(name).is_some()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CATALOG
// ═══════════════════════════════════════════════════════════════════════════════

fn event(name: &str, description: &str, object_props: &[&str]) -> EventDefinition {
    EventDefinition {
        name: name.to_string(),
        description: description.to_string(),
        event_object_props: if object_props.is_empty() {
            None
        } else {
            Some(object_props.iter().map(|p| p.to_string()).collect())
        },
    }
}

fn click() -> EventDefinition {
    event("onClick", "Fires when the element is clicked", &[])
}

fn component(
    name: &str,
    category: ComponentCategory,
    icon: &str,
    description: &str,
    accepts_children: bool,
    props: Vec<PropDefinition>,
    events: Vec<EventDefinition>,
) -> ComponentDefinition {
    ComponentDefinition {
        name: name.to_string(),
        category,
        description: description.to_string(),
        icon: icon.to_string(),
        props,
        events,
        accepts_children,
    }
}

fn build_catalog() -> Vec<ComponentDefinition> {
    use ComponentCategory::*;
    use PropType as T;
    let p = PropDefinition::new;

    vec![
        // Layout
        component("Container", Layout, "box", "Generic block container", true,
            vec![p("maxWidth", T::String, "Maximum content width").placeholder("1200px")],
            vec![click()]),
        component("Row", Layout, "columns", "Horizontal flex layout", true,
            vec![
                p("gap", T::Number, "Space between children").default_value(json!(0)),
                p("align", T::Select, "Cross-axis alignment")
                    .options(&["start", "center", "end", "stretch"])
                    .default_value(json!("stretch")),
                p("wrap", T::Boolean, "Wrap children onto new lines").default_value(json!(false)),
            ],
            vec![]),
        component("Column", Layout, "rows", "Vertical flex layout", true,
            vec![
                p("gap", T::Number, "Space between children").default_value(json!(0)),
                p("align", T::Select, "Cross-axis alignment")
                    .options(&["start", "center", "end", "stretch"])
                    .default_value(json!("stretch")),
            ],
            vec![]),
        component("Grid", Layout, "grid", "CSS grid layout", true,
            vec![
                p("columns", T::Number, "Number of columns").default_value(json!(2)),
                p("gap", T::Number, "Space between cells").default_value(json!(16)),
            ],
            vec![]),
        component("Card", Layout, "square", "Elevated surface for grouped content", true,
            vec![
                p("title", T::String, "Card heading"),
                p("elevated", T::Boolean, "Draw a drop shadow").default_value(json!(true)),
            ],
            vec![click()]),
        component("Section", Layout, "layout", "Page section with vertical padding", true,
            vec![p("id", T::String, "Anchor id")],
            vec![]),
        // Typography
        component("Text", Typography, "type", "Inline or block text", false,
            vec![
                p("content", T::String, "Displayed text").placeholder("Enter text"),
                p("variant", T::Select, "Text style")
                    .options(&["body", "caption", "overline", "lead"])
                    .default_value(json!("body")),
                p("color", T::Color, "Text color"),
            ],
            vec![click()]),
        component("Heading", Typography, "heading", "Section heading", false,
            vec![
                p("content", T::String, "Heading text").required().placeholder("Heading"),
                p("level", T::Select, "Heading level")
                    .options(&["1", "2", "3", "4", "5", "6"])
                    .default_value(json!("2")),
            ],
            vec![]),
        component("Link", Typography, "link", "Hyperlink", false,
            vec![
                p("text", T::String, "Link text"),
                p("href", T::String, "Target URL").required().placeholder("https://"),
                p("external", T::Boolean, "Open in a new tab").default_value(json!(false)),
            ],
            vec![click()]),
        // Button
        component("Button", Button, "mouse-pointer-click", "Clickable button", false,
            vec![
                p("content", T::String, "Button label").placeholder("Click me"),
                p("variant", T::Select, "Visual style")
                    .options(&["primary", "secondary", "outline", "ghost", "danger"])
                    .default_value(json!("primary")),
                p("size", T::Select, "Button size")
                    .options(&["small", "medium", "large"])
                    .default_value(json!("medium")),
                p("disabled", T::Boolean, "Disable interaction").default_value(json!(false)),
            ],
            vec![click(), event("onHover", "Fires when the pointer enters the button", &[])]),
        component("IconButton", Button, "circle-dot", "Button showing only an icon", false,
            vec![
                p("icon", T::String, "Icon name").required(),
                p("label", T::String, "Accessible label"),
            ],
            vec![click()]),
        // Form
        component("Form", Form, "clipboard-list", "Form wrapper that handles submission", true,
            vec![p("action", T::String, "Submission endpoint")],
            vec![event("onSubmit", "Fires when the form is submitted", &["target"])]),
        component("Input", Form, "text-cursor-input", "Single-line text field", false,
            vec![
                p("label", T::String, "Field label"),
                p("placeholder", T::String, "Placeholder text"),
                p("value", T::Expression, "Bound value"),
                p("type", T::Select, "Input type")
                    .options(&["text", "email", "password", "number", "search"])
                    .default_value(json!("text")),
                p("required", T::Boolean, "Mark as required").default_value(json!(false)),
            ],
            vec![
                event("onChange", "Fires when the value changes", &["target.value"]),
                event("onKeyDown", "Fires on key press", &["key"]),
            ]),
        component("Textarea", Form, "align-left", "Multi-line text field", false,
            vec![
                p("placeholder", T::String, "Placeholder text"),
                p("rows", T::Number, "Visible rows").default_value(json!(3)),
                p("value", T::Expression, "Bound value"),
            ],
            vec![event("onChange", "Fires when the value changes", &["target.value"])]),
        component("Checkbox", Form, "check-square", "Boolean toggle with label", false,
            vec![
                p("label", T::String, "Checkbox label"),
                p("checked", T::Boolean, "Checked state").default_value(json!(false)),
            ],
            vec![event("onChange", "Fires when toggled", &["target.checked"])]),
        component("Select", Form, "chevron-down", "Dropdown selection", false,
            vec![
                p("options", T::Array, "Available options"),
                p("value", T::Expression, "Bound value"),
                p("placeholder", T::String, "Placeholder text"),
            ],
            vec![event("onChange", "Fires when the selection changes", &["target.value"])]),
        // Feedback
        component("Alert", Feedback, "alert-circle", "Inline status message", false,
            vec![
                p("message", T::String, "Alert text").required(),
                p("variant", T::Select, "Severity")
                    .options(&["info", "success", "warning", "error"])
                    .default_value(json!("info")),
                p("dismissible", T::Boolean, "Show a close button").default_value(json!(false)),
            ],
            vec![event("onDismiss", "Fires when the alert is closed", &[])]),
        component("Badge", Feedback, "tag", "Small status label", false,
            vec![
                p("text", T::String, "Badge text"),
                p("color", T::Color, "Badge color"),
            ],
            vec![]),
        component("Spinner", Feedback, "loader", "Loading indicator", false,
            vec![p("size", T::Select, "Spinner size")
                .options(&["small", "medium", "large"])
                .default_value(json!("medium"))],
            vec![]),
        component("Progress", Feedback, "bar-chart", "Progress bar", false,
            vec![
                p("value", T::Number, "Current value").default_value(json!(0)),
                p("max", T::Number, "Maximum value").default_value(json!(100)),
            ],
            vec![]),
        // Navigation
        component("Navbar", Navigation, "menu", "Top navigation bar", true,
            vec![
                p("brand", T::String, "Brand text"),
                p("sticky", T::Boolean, "Stick to the top on scroll").default_value(json!(false)),
            ],
            vec![]),
        component("Tabs", Navigation, "folder", "Tabbed navigation", true,
            vec![
                p("tabs", T::Array, "Tab labels"),
                p("active", T::Expression, "Active tab index"),
            ],
            vec![event("onChange", "Fires when the active tab changes", &["index"])]),
        component("Breadcrumb", Navigation, "chevrons-right", "Path trail", false,
            vec![p("items", T::Array, "Breadcrumb entries")],
            vec![]),
        // Data Display
        component("List", DataDisplay, "list", "Rendered collection", true,
            vec![
                p("items", T::Array, "Items to render"),
                p("ordered", T::Boolean, "Numbered list").default_value(json!(false)),
            ],
            vec![]),
        component("Table", DataDisplay, "table", "Tabular data", false,
            vec![
                p("columns", T::Array, "Column definitions"),
                p("data", T::Expression, "Row data"),
                p("striped", T::Boolean, "Alternate row shading").default_value(json!(false)),
            ],
            vec![event("onRowClick", "Fires when a row is clicked", &["row", "index"])]),
        component("Avatar", DataDisplay, "user", "User picture or initials", false,
            vec![
                p("src", T::String, "Image URL"),
                p("name", T::String, "Name used for initials"),
                p("size", T::Number, "Diameter in pixels").default_value(json!(40)),
            ],
            vec![]),
        // Media
        component("Image", Media, "image", "Responsive image", false,
            vec![
                p("src", T::String, "Image URL").required(),
                p("alt", T::String, "Alternative text"),
                p("fit", T::Select, "Object fit")
                    .options(&["cover", "contain", "fill"])
                    .default_value(json!("cover")),
            ],
            vec![event("onLoad", "Fires when the image has loaded", &[])]),
        component("Video", Media, "video", "Video player", false,
            vec![
                p("src", T::String, "Video URL").required(),
                p("autoplay", T::Boolean, "Start playing automatically").default_value(json!(false)),
                p("controls", T::Boolean, "Show player controls").default_value(json!(true)),
            ],
            vec![event("onEnded", "Fires when playback ends", &[])]),
        component("Icon", Media, "star", "Vector icon", false,
            vec![
                p("name", T::String, "Icon name").required(),
                p("size", T::Number, "Size in pixels").default_value(json!(16)),
            ],
            vec![]),
        // Overlay
        component("Modal", Overlay, "square-stack", "Dialog over the page", true,
            vec![
                p("title", T::String, "Dialog title"),
                p("open", T::Expression, "Visibility binding"),
            ],
            vec![event("onClose", "Fires when the dialog is dismissed", &[])]),
        component("Tooltip", Overlay, "message-square", "Hover hint around its child", true,
            vec![
                p("text", T::String, "Tooltip text"),
                p("placement", T::Select, "Placement")
                    .options(&["top", "right", "bottom", "left"])
                    .default_value(json!("top")),
            ],
            vec![]),
        // E-commerce
        component("ProductCard", ECommerce, "shopping-bag", "Product summary tile", false,
            vec![
                p("title", T::String, "Product name"),
                p("price", T::Number, "Price"),
                p("image", T::String, "Product image URL"),
            ],
            vec![event("onAddToCart", "Fires when the add-to-cart button is pressed", &[])]),
        component("PriceTag", ECommerce, "dollar-sign", "Formatted price", false,
            vec![
                p("amount", T::Number, "Amount").required(),
                p("currency", T::String, "ISO currency code").default_value(json!("USD")),
            ],
            vec![]),
        // Social
        component("ShareButton", Social, "share", "Share to a social network", false,
            vec![
                p("label", T::String, "Button label"),
                p("network", T::Select, "Target network")
                    .options(&["twitter", "facebook", "linkedin", "email"])
                    .default_value(json!("twitter")),
            ],
            vec![click()]),
        component("Comment", Social, "message-circle", "User comment", false,
            vec![
                p("text", T::String, "Comment body"),
                p("author", T::String, "Author name"),
            ],
            vec![]),
        // Marketing
        component("Hero", Marketing, "sparkles", "Large introductory banner", true,
            vec![
                p("title", T::String, "Headline"),
                p("subtitle", T::String, "Supporting line"),
            ],
            vec![]),
        component("CallToAction", Marketing, "megaphone", "Prominent action prompt", false,
            vec![
                p("label", T::String, "Action label"),
                p("href", T::String, "Target URL"),
            ],
            vec![click()]),
        // Utility
        component("Divider", Utility, "minus", "Horizontal rule", false,
            vec![p("spacing", T::Number, "Margin above and below").default_value(json!(16))],
            vec![]),
        component("Spacer", Utility, "move-vertical", "Fixed empty space", false,
            vec![p("size", T::Number, "Height in pixels").default_value(json!(16))],
            vec![]),
    ]
}

lazy_static! {
    static ref CATALOG: Vec<ComponentDefinition> = build_catalog();
    static ref BY_NAME: HashMap<String, usize> = CATALOG
        .iter()
        .enumerate()
        .map(|(i, def)| (def.name.clone(), i))
        .collect();
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOOKUP
// ═══════════════════════════════════════════════════════════════════════════════

pub fn all_components() -> &'static [ComponentDefinition] {
    &CATALOG
}

pub fn get_component_by_name(name: &str) -> Option<&'static ComponentDefinition> {
    BY_NAME.get(name).map(|&i| &CATALOG[i])
}

pub fn components_by_category(category: ComponentCategory) -> Vec<&'static ComponentDefinition> {
    CATALOG.iter().filter(|c| c.category == category).collect()
}

/// Case-insensitive match on name, description or category.
pub fn search_components(query: &str) -> Vec<&'static ComponentDefinition> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return CATALOG.iter().collect();
    }
    CATALOG
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&q)
                || c.description.to_lowercase().contains(&q)
                || c.category.label().to_lowercase().contains(&q)
        })
        .collect()
}

/// Prop that holds a node's inner text: the first entry of
/// [`TEXT_CONTENT_PROPS`] the definition declares. Unknown components have none.
pub fn text_content_prop(def: Option<&ComponentDefinition>) -> Option<&'static str> {
    let def = def?;
    TEXT_CONTENT_PROPS
        .iter()
        .copied()
        .find(|name| def.declares_prop(name))
}

/// Unknown tags (plain HTML such as `div`) keep whatever children they have.
pub fn accepts_children(def: Option<&ComponentDefinition>) -> bool {
    def.map(|d| d.accepts_children).unwrap_or(true)
}
