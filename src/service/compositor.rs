use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::path::Path;

use crate::error::DocumentError;

/// 页面继承属性的最大回溯深度 (防止 Parent 环)
const MAX_TREE_DEPTH: usize = 32;

/// 页面属性, 沿 Parent 链查找继承值 (Resources / MediaBox)
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Some(value);
        }
        let parent = node.get(b"Parent").and_then(Object::as_reference).ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

fn deref<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn as_number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// 页面尺寸 [x0, y0, x1, y1]
fn media_box(doc: &Document, page_id: ObjectId) -> Result<[f32; 4], DocumentError> {
    let raw = inherited(doc, page_id, b"MediaBox")
        .map(|o| deref(doc, o))
        .ok_or_else(|| DocumentError::Malformed(format!("page {:?} has no MediaBox", page_id)))?;
    let values: Vec<f32> = match raw {
        Object::Array(items) => items
            .iter()
            .filter_map(|o| as_number(deref(doc, o)))
            .collect(),
        _ => Vec::new(),
    };
    match values.as_slice() {
        [x0, y0, x1, y1] if (x1 - x0).abs() > f32::EPSILON && (y1 - y0).abs() > f32::EPSILON => {
            Ok([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)])
        }
        _ => Err(DocumentError::Malformed(format!(
            "page {:?} has an invalid MediaBox",
            page_id
        ))),
    }
}

/// 内容页坐标 -> 模板页坐标: 缩放到模板尺寸并对齐原点
fn fit_matrix(content: [f32; 4], template: [f32; 4]) -> [f32; 6] {
    let sx = (template[2] - template[0]) / (content[2] - content[0]);
    let sy = (template[3] - template[1]) / (content[3] - content[1]);
    [
        sx,
        0.0,
        0.0,
        sy,
        template[0] - content[0] * sx,
        template[1] - content[1] * sy,
    ]
}

fn reals(values: &[f32]) -> Object {
    Object::Array(values.iter().map(|v| Object::Real((*v).into())).collect())
}

/// 把内容页封装成 Form XObject, 返回对象 id
fn page_as_form(doc: &mut Document, page_id: ObjectId, fit: [f32; 4]) -> Result<ObjectId, DocumentError> {
    let bbox = media_box(doc, page_id)?;
    let content = doc.get_page_content(page_id)?;
    let resources = inherited(doc, page_id, b"Resources")
        .map(|o| deref(doc, o).clone())
        .unwrap_or_else(|| Object::Dictionary(Dictionary::new()));

    let form = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => reals(&bbox),
            "Matrix" => reals(&fit_matrix(bbox, fit)),
            "Resources" => resources,
        },
        content,
    );
    Ok(doc.add_object(form))
}

/// 模板页挂上 XObject 并在原内容之后绘制
fn stamp_page(doc: &mut Document, page_id: ObjectId, form_id: ObjectId, name: &str) -> Result<(), DocumentError> {
    let mut resources = match inherited(doc, page_id, b"Resources").map(|o| deref(doc, o)) {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    let mut xobjects = match resources.get(b"XObject").map(|o| deref(doc, o)) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };
    xobjects.set(name, Object::Reference(form_id));
    resources.set("XObject", Object::Dictionary(xobjects));

    // Contents 可能是流引用、直接数组或指向数组的引用
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(contents) => match deref(doc, contents) {
            Object::Array(items) => items.clone(),
            Object::Stream(_) => vec![contents.clone()],
            _ => Vec::new(),
        },
        Err(_) => Vec::new(),
    };
    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let draw = format!("Q\nq /{} Do Q\n", name);
    let draw_id = doc.add_object(Stream::new(Dictionary::new(), draw.into_bytes()));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(draw_id));

    let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
    page.set("Resources", Object::Dictionary(resources));
    page.set("Contents", Object::Array(contents));
    Ok(())
}

/// 逐页叠加: 处理 min(模板页数, 内容页数) 页, 多余的模板页删除
pub fn composite(mut template: Document, mut content: Document) -> Result<Document, DocumentError> {
    let template_pages: Vec<ObjectId> = template.get_pages().into_values().collect();
    content.renumber_objects_with(template.max_id + 1);
    let content_pages: Vec<ObjectId> = content.get_pages().into_values().collect();

    let count = template_pages.len().min(content_pages.len());
    if count == 0 {
        return Err(DocumentError::NoPages);
    }

    // 内容文档的对象并入模板; 未被引用的部分最后统一清理
    template.max_id = template.max_id.max(content.max_id);
    template.objects.extend(content.objects);

    for (index, (&target, &source)) in template_pages.iter().zip(&content_pages).take(count).enumerate() {
        let fit = media_box(&template, target)?;
        let form_id = page_as_form(&mut template, source, fit)?;
        stamp_page(&mut template, target, form_id, &format!("Composite{}", index + 1))?;
    }

    let extra: Vec<u32> = ((count + 1)..=template_pages.len()).map(|n| n as u32).collect();
    if !extra.is_empty() {
        template.delete_pages(&extra);
    }
    template.prune_objects();
    template.compress();
    Ok(template)
}

/// 叠加后写入输出路径, 返回页数
pub fn composite_to_file(template: Document, content: Document, output: &Path) -> Result<usize, DocumentError> {
    let mut merged = composite(template, content)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    merged.save(output)?;
    Ok(merged.get_pages().len())
}
