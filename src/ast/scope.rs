//! Package-level objects and the per-file scope that holds them

use std::cell::OnceCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::{FuncDecl, TypeSpec, ValueSpec};
use crate::{inspect_enum, inspect_scalar, inspect_struct};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Con,
    Typ,
    Var,
    Fun,
}

/// The declaration an object was introduced by.
#[derive(Debug, Clone)]
pub enum ObjDecl {
    Func(Weak<FuncDecl>),
    Value(Weak<ValueSpec>),
    Type(Weak<TypeSpec>),
}

/// A named package-level entity: constant, type, variable or function.
///
/// The declaration is attached once the declaring node exists, which is
/// after every identifier naming the object has been built.
#[derive(Debug)]
pub struct Object {
    pub kind: ObjKind,
    pub name: String,
    pub decl: OnceCell<ObjDecl>,
}

impl Object {
    pub fn new(kind: ObjKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            decl: OnceCell::new(),
        }
    }

    /// Attach the declaring node. Returns false if one was already attached.
    pub fn set_decl(&self, decl: ObjDecl) -> bool {
        self.decl.set(decl).is_ok()
    }

    /// The function declaration, if this object names a live function.
    pub fn func_decl(&self) -> Option<Rc<FuncDecl>> {
        match self.decl.get()? {
            ObjDecl::Func(decl) => decl.upgrade(),
            _ => None,
        }
    }
}

/// Names declared at the top level of a file.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub objects: BTreeMap<String, Rc<Object>>,
}

impl Scope {
    /// Insert `obj` unless its name is taken; returns the object already
    /// declared under that name, if any.
    pub fn insert(&mut self, obj: Rc<Object>) -> Option<Rc<Object>> {
        if let Some(existing) = self.objects.get(&obj.name) {
            return Some(Rc::clone(existing));
        }
        self.objects.insert(obj.name.clone(), obj);
        None
    }

    pub fn lookup(&self, name: &str) -> Option<&Rc<Object>> {
        self.objects.get(name)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

inspect_scalar!(ObjKind);
inspect_enum!(ObjDecl { Func, Value, Type });
inspect_struct!(Object { kind, name, decl });
inspect_struct!(Scope { objects });

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BlockStmt, FieldList, FuncType, Ident, Position};
    use crate::printer::sprint;

    fn func(name: &str, obj: Option<Rc<Object>>) -> Rc<FuncDecl> {
        Rc::new(FuncDecl {
            recv: None,
            name: Ident {
                pos: Position::new(0, 1, 6),
                name: name.to_string(),
                obj,
            },
            typ: FuncType {
                func: Position::new(0, 1, 1),
                params: FieldList::default(),
                results: None,
            },
            body: Some(BlockStmt::default()),
        })
    }

    #[test]
    fn test_insert_keeps_first_declaration() {
        let mut scope = Scope::default();
        assert!(scope.insert(Rc::new(Object::new(ObjKind::Fun, "F"))).is_none());
        let clash = scope.insert(Rc::new(Object::new(ObjKind::Var, "F")));
        assert_eq!(clash.map(|o| o.kind), Some(ObjKind::Fun));
        assert_eq!(scope.len(), 1);
        assert_eq!(scope.lookup("F").map(|o| o.kind), Some(ObjKind::Fun));
        assert!(scope.lookup("G").is_none());
    }

    #[test]
    fn test_decl_attaches_once() {
        let obj = Rc::new(Object::new(ObjKind::Fun, "F"));
        let decl = func("F", Some(Rc::clone(&obj)));
        assert!(obj.set_decl(ObjDecl::Func(Rc::downgrade(&decl))));
        assert!(!obj.set_decl(ObjDecl::Func(Rc::downgrade(&decl))));
        assert!(obj.func_decl().is_some_and(|d| Rc::ptr_eq(&d, &decl)));
    }

    #[test]
    fn test_object_back_reference_prints_as_cycle() {
        let obj = Rc::new(Object::new(ObjKind::Fun, "F"));
        let decl = func("F", Some(Rc::clone(&obj)));
        obj.set_decl(ObjDecl::Func(Rc::downgrade(&decl)));

        let out = sprint(&decl);
        // the declaration starts on line 0; the object's decl points back at it
        assert!(out.starts_with("&FuncDecl {\n"));
        assert!(out.contains("decl: &(obj @ 0),"), "{out}");
        assert_eq!(out.matches("&FuncDecl").count(), 1);
    }

    #[test]
    fn test_dropped_declaration_prints_nil() {
        let obj = Rc::new(Object::new(ObjKind::Fun, "F"));
        obj.set_decl(ObjDecl::Func(Rc::downgrade(&func("F", None))));
        assert!(obj.func_decl().is_none());
        assert_eq!(
            sprint(&obj),
            "&Object {\n  kind: Fun,\n  name: \"F\",\n}\n"
        );
    }
}
